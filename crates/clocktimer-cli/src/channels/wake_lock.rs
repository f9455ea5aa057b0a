use std::process::{Child, Command, Stdio};

use clocktimer_core::error::ChannelError;
use clocktimer_core::sync::WakeLock;
use tracing::debug;

const SYSTEMD_INHIBIT_ARGS: &[&str] = &[
    "--what=idle",
    "--who=clocktimer",
    "--why=Countdown running",
    "sleep",
    "infinity",
];
const CAFFEINATE_ARGS: &[&str] = &["-d", "-i"];

/// Holds an idle inhibitor child process for as long as the lock is held.
pub struct InhibitorLock {
    program: Option<(&'static str, &'static [&'static str])>,
    child: Option<Child>,
}

impl InhibitorLock {
    pub fn for_platform() -> Self {
        let program = if cfg!(target_os = "linux") {
            Some(("systemd-inhibit", SYSTEMD_INHIBIT_ARGS))
        } else if cfg!(target_os = "macos") {
            Some(("caffeinate", CAFFEINATE_ARGS))
        } else {
            None
        };
        Self {
            program,
            child: None,
        }
    }

    fn is_alive(&mut self) -> bool {
        match self.child.as_mut().map(Child::try_wait) {
            Some(Ok(None)) => true,
            Some(_) => {
                self.child = None;
                false
            }
            None => false,
        }
    }
}

impl WakeLock for InhibitorLock {
    fn acquire(&mut self) -> Result<(), ChannelError> {
        if self.is_alive() {
            return Ok(());
        }
        let (program, args) = self.program.ok_or(ChannelError::Unsupported("wake lock"))?;
        let child = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ChannelError::failed("wake lock", format!("{program}: {e}")))?;
        debug!(channel = "wake_lock", pid = child.id(), "inhibitor started");
        self.child = Some(child);
        Ok(())
    }

    fn release(&mut self) -> Result<(), ChannelError> {
        let Some(mut child) = self.child.take() else {
            return Ok(());
        };
        // Already exited is fine.
        let _ = child.kill();
        child
            .wait()
            .map(|_| ())
            .map_err(|e| ChannelError::failed("wake lock", e))
    }
}

impl Drop for InhibitorLock {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
