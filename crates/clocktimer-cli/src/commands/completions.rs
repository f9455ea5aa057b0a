use clap::CommandFactory;
use clap_complete::Shell;

use super::CommandResult;
use crate::Cli;

pub fn run(shell: Shell) -> CommandResult {
    let mut command = Cli::command();
    clap_complete::generate(shell, &mut command, "clocktimer", &mut std::io::stdout());
    Ok(())
}
