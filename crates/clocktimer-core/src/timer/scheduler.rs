use std::time::{Duration, Instant};

/// Tick interval.
pub const TICK: Duration = Duration::from_secs(1);

/// Converts wall-clock progress into a count of due engine ticks.
///
/// Armed when the countdown starts and disarmed when it stops. Each call to
/// [`due`](Self::due) reports how many whole seconds passed since the last
/// accounted tick and advances the anchor by exactly that many, so late
/// deliveries are coalesced without losing the fractional remainder.
#[derive(Debug, Clone, Default)]
pub struct TickScheduler {
    anchor: Option<Instant>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm(&mut self, now: Instant) {
        self.anchor = Some(now);
    }

    pub fn disarm(&mut self) {
        self.anchor = None;
    }

    pub fn is_armed(&self) -> bool {
        self.anchor.is_some()
    }

    pub fn due(&mut self, now: Instant) -> u32 {
        let Some(anchor) = self.anchor else {
            return 0;
        };
        let elapsed = now.saturating_duration_since(anchor);
        let ticks = (elapsed.as_secs()).min(u32::MAX as u64) as u32;
        if ticks > 0 {
            self.anchor = Some(anchor + TICK * ticks);
        }
        ticks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disarmed_never_due() {
        let mut sched = TickScheduler::new();
        assert_eq!(sched.due(Instant::now() + Duration::from_secs(10)), 0);
    }

    #[test]
    fn counts_whole_seconds_and_keeps_remainder() {
        let start = Instant::now();
        let mut sched = TickScheduler::new();
        sched.arm(start);
        assert_eq!(sched.due(start + Duration::from_millis(900)), 0);
        assert_eq!(sched.due(start + Duration::from_millis(1500)), 1);
        assert_eq!(sched.due(start + Duration::from_millis(1999)), 0);
        assert_eq!(sched.due(start + Duration::from_millis(2000)), 1);
    }

    #[test]
    fn coalesces_stalls() {
        let start = Instant::now();
        let mut sched = TickScheduler::new();
        sched.arm(start);
        assert_eq!(sched.due(start + Duration::from_millis(7300)), 7);
        assert_eq!(sched.due(start + Duration::from_millis(8000)), 1);
    }

    #[test]
    fn disarm_stops_ticks() {
        let start = Instant::now();
        let mut sched = TickScheduler::new();
        sched.arm(start);
        sched.disarm();
        assert!(!sched.is_armed());
        assert_eq!(sched.due(start + Duration::from_secs(5)), 0);
    }
}
