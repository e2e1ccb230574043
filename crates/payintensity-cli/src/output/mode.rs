use crate::cli::{CodesCommand, Commands, NormalizeCommand, PublishCommand};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    let json = match command {
        Commands::Normalize { command } => match command {
            NormalizeCommand::Gdp { json, .. } | NormalizeCommand::PerCapita { json, .. } => *json,
        },
        Commands::Publish {
            command: PublishCommand::Script { json, .. },
        } => *json,
        Commands::Codes {
            command: CodesCommand::Check { json, .. },
        } => *json,
    };
    if json {
        OutputMode::Json
    } else {
        OutputMode::Text
    }
}
