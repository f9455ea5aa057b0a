use clap::Subcommand;
use clocktimer_core::error::ValidationError;
use clocktimer_core::{CountdownThreshold, SOUND_OPTIONS};

use super::{open_headless, print_json, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the stored settings as JSON
    Show,
    /// List the available alarm sounds
    Sounds,
    /// List the countdown cue thresholds to choose from
    Options,
    /// Choose the countdown cue threshold ("off" or a listed number of seconds)
    Threshold { value: String },
    /// Enter a custom countdown cue threshold in seconds
    Custom { value: String },
    /// Choose the alarm sound by id
    Sound { id: String },
}

pub fn run(action: SettingsAction) -> CommandResult {
    let mut app = open_headless();

    match action {
        SettingsAction::Show => print_json(app.settings())?,
        SettingsAction::Sounds => {
            for sound in SOUND_OPTIONS {
                let marker = if sound.id == app.settings().alarm_sound_id {
                    "*"
                } else {
                    " "
                };
                println!("{marker} {:<10} {}", sound.id, sound.display_name);
            }
        }
        SettingsAction::Options => print_json(&app.settings().threshold_options())?,
        SettingsAction::Threshold { value } => {
            let threshold: CountdownThreshold = value.parse()?;
            if let CountdownThreshold::Seconds(secs) = threshold {
                let listed = app.settings().threshold_options();
                if !listed.contains(&secs.to_string()) {
                    return Err(ValidationError::InvalidValue {
                        field: "countdownSound".into(),
                        message: format!(
                            "{secs} is not a listed option; use `settings custom {secs}`"
                        ),
                    }
                    .into());
                }
            }
            app.set_countdown_threshold(threshold);
            print_json(app.settings())?;
        }
        SettingsAction::Custom { value } => {
            app.submit_custom_threshold(&value)?;
            print_json(app.settings())?;
        }
        SettingsAction::Sound { id } => {
            app.set_alarm_sound(&id)?;
            print_json(app.settings())?;
        }
    }
    Ok(())
}
