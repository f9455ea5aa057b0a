use clap::Subcommand;
use clocktimer_core::Theme;

use super::{open_headless, CommandResult};

#[derive(Subcommand)]
pub enum ThemeAction {
    /// Print the current theme
    Show,
    /// List the available themes
    List,
    /// Switch theme
    Set {
        /// Theme name (green, yellow, blue, purple, red)
        name: String,
    },
}

pub fn run(action: ThemeAction) -> CommandResult {
    match action {
        ThemeAction::Show => {
            let app = open_headless();
            println!("{}", app.theme());
        }
        ThemeAction::List => {
            for theme in Theme::ALL {
                println!(
                    "{:<7} {:<7} {} / {}",
                    theme.as_str(),
                    theme.display_name(),
                    theme.primary(),
                    theme.dark()
                );
            }
        }
        ThemeAction::Set { name } => {
            let theme: Theme = name.parse()?;
            let mut app = open_headless();
            app.set_theme(theme);
            println!("{theme}");
        }
    }
    Ok(())
}
