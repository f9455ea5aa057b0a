use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use clocktimer_core::error::ChannelError;
use clocktimer_core::sound::find_sound;
use clocktimer_core::sync::AudioPlayer;
use clocktimer_core::{Config, Tone};
use tracing::debug;

/// Players probed in order when the config does not name one.
const KNOWN_PLAYERS: &[&str] = &["paplay", "afplay"];

/// Plays catalog sounds with an external player and synthesized tones with
/// the terminal bell.
pub struct CommandAudio {
    player: Option<String>,
    sounds_dir: Option<PathBuf>,
    bell: bool,
}

impl CommandAudio {
    pub fn from_config(config: &Config) -> Self {
        let player = if config.audio.player.is_empty() {
            KNOWN_PLAYERS
                .iter()
                .find(|p| on_path(p))
                .map(|p| p.to_string())
        } else {
            Some(config.audio.player.clone())
        };
        let sounds_dir = Config::sounds_dir()
            .map_err(|e| debug!(channel = "audio", "no sounds directory: {e}"))
            .ok();
        debug!(channel = "audio", player = ?player, "audio configured");

        Self {
            player,
            sounds_dir,
            bell: std::io::stderr().is_terminal(),
        }
    }

    fn sound_path(&self, sound_id: &str) -> Result<PathBuf, ChannelError> {
        let file = find_sound(sound_id)
            .and_then(|s| s.file)
            .ok_or_else(|| ChannelError::failed("audio", format!("no file for '{sound_id}'")))?;
        let dir = self
            .sounds_dir
            .as_ref()
            .ok_or(ChannelError::Unsupported("audio"))?;
        let path = dir.join(file);
        if !path.is_file() {
            return Err(ChannelError::failed(
                "audio",
                format!("missing {}", path.display()),
            ));
        }
        Ok(path)
    }
}

impl AudioPlayer for CommandAudio {
    fn play(&mut self, sound_id: &str, volume: f32) -> Result<(), ChannelError> {
        let path = self.sound_path(sound_id)?;
        let player = self.player.as_deref().ok_or(ChannelError::Unsupported("audio"))?;

        let mut command = Command::new(player);
        command.args(volume_args(player, volume));
        command
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        let mut child = command
            .spawn()
            .map_err(|e| ChannelError::failed("audio", format!("{player}: {e}")))?;

        // Reap in the background; playback is fire-and-forget.
        std::thread::spawn(move || {
            let _ = child.wait();
        });
        Ok(())
    }

    fn play_tone(&mut self, tone: Tone) -> Result<(), ChannelError> {
        if !self.bell {
            return Ok(());
        }
        debug!(channel = "audio", frequency = tone.frequency_hz, "bell");
        let mut err = std::io::stderr().lock();
        err.write_all(b"\x07")
            .and_then(|()| err.flush())
            .map_err(|e| ChannelError::failed("audio", e))
    }
}

/// Volume flags understood by the known players.
fn volume_args(player: &str, volume: f32) -> Vec<String> {
    let volume = volume.clamp(0.0, 1.0);
    let name = Path::new(player)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(player);
    match name {
        // 65536 is 100%.
        "paplay" => vec![format!("--volume={}", (volume * 65536.0).round() as u32)],
        "afplay" => vec!["-v".into(), format!("{volume:.2}")],
        _ => Vec::new(),
    }
}

fn on_path(program: &str) -> bool {
    std::env::var_os("PATH")
        .map(|paths| std::env::split_paths(&paths).any(|dir| dir.join(program).is_file()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn volume_flags_per_player() {
        assert_eq!(volume_args("paplay", 0.5), ["--volume=32768"]);
        assert_eq!(volume_args("/usr/bin/afplay", 1.5), ["-v", "1.00"]);
        assert!(volume_args("mpv", 0.5).is_empty());
    }

    #[test]
    fn default_sound_has_no_file() {
        let audio = CommandAudio {
            player: Some("paplay".into()),
            sounds_dir: Some(PathBuf::from("/nonexistent")),
            bell: false,
        };
        assert!(audio.sound_path("default").is_err());
        assert!(audio.sound_path("pop").is_err());
    }

    #[test]
    fn silent_bell_when_not_a_terminal() {
        let mut audio = CommandAudio {
            player: None,
            sounds_dir: None,
            bell: false,
        };
        assert!(audio.play_tone(Tone::ALARM).is_ok());
        assert!(matches!(
            audio.play("pop", 1.0),
            Err(ChannelError::Unsupported("audio"))
        ));
    }
}
