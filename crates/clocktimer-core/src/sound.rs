//! Alarm sound catalog and the synthesized fallback tones.

use serde::Serialize;

/// Sound id that always plays the synthesized alarm tone.
pub const DEFAULT_SOUND_ID: &str = "default";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SoundOption {
    pub id: &'static str,
    pub display_name: &'static str,
    /// File name under the sounds directory. `None` means synthesized only.
    pub file: Option<&'static str>,
}

pub const SOUND_OPTIONS: &[SoundOption] = &[
    SoundOption { id: "default", display_name: "Default", file: None },
    SoundOption { id: "beep", display_name: "Beep", file: Some("beep.mp3") },
    SoundOption { id: "chirp", display_name: "Chirp", file: Some("chirp.mp3") },
    SoundOption { id: "digital", display_name: "Digital", file: Some("digital.mp3") },
    SoundOption { id: "e-chirp", display_name: "E-Chirp", file: Some("e-chirp.mp3") },
    SoundOption { id: "heartbeat", display_name: "Heartbeat", file: Some("heartbeat.mp3") },
    SoundOption { id: "long-pop", display_name: "Long Pop", file: Some("long pop.mp3") },
    SoundOption { id: "pop", display_name: "Pop", file: Some("pop.mp3") },
    SoundOption { id: "war", display_name: "War", file: Some("war.mp3") },
];

pub fn find_sound(id: &str) -> Option<&'static SoundOption> {
    SOUND_OPTIONS.iter().find(|s| s.id == id)
}

pub fn is_valid_sound(id: &str) -> bool {
    find_sound(id).is_some()
}

/// Display name for a sound id; unknown ids read as "Default".
pub fn sound_display_name(id: &str) -> &'static str {
    find_sound(id).map(|s| s.display_name).unwrap_or("Default")
}

/// A synthesized sine beep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Tone {
    pub frequency_hz: u32,
    pub duration_ms: u32,
    /// 0.0 ..= 1.0
    pub volume: f32,
}

impl Tone {
    pub const ALARM: Tone = Tone {
        frequency_hz: 800,
        duration_ms: 300,
        volume: 0.3,
    };

    /// Softer and shorter than the alarm so the two are distinguishable.
    pub const COUNTDOWN: Tone = Tone {
        frequency_hz: 600,
        duration_ms: 150,
        volume: 0.15,
    };
}
