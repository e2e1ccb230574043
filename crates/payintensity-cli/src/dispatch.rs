use std::time::Duration;

use payintensity_client::commands;
use payintensity_client::commands::normalize::{NormalizeOptions, ReferenceSource};
use payintensity_client::commands::publish::{PublishScriptOptions, ScriptTarget};
use payintensity_client::derive::MetricMode;
use payintensity_client::reference::remote::RemoteOptions;
use payintensity_client::{ClientResult, SuccessEnvelope};

use crate::cli::{
    Cli, CodesCommand, Commands, NormalizeCommand, PublishCommand, RemoteArgs, ScriptArgs,
    TableArgs,
};

pub fn dispatch(cli: &Cli) -> ClientResult<SuccessEnvelope> {
    match &cli.command {
        Commands::Normalize { command } => match command {
            NormalizeCommand::Gdp {
                io,
                gdp_table,
                script,
                ..
            } => commands::normalize::run(normalize_options(
                io,
                MetricMode::GdpPercentage,
                ReferenceSource::StaticGdp {
                    table_path: gdp_table.clone(),
                },
                script,
            )),
            NormalizeCommand::PerCapita {
                io, remote, script, ..
            } => commands::normalize::run(normalize_options(
                io,
                MetricMode::PerCapita,
                ReferenceSource::RemotePopulation(remote_options(remote)),
                script,
            )),
        },
        Commands::Publish { command } => match command {
            PublishCommand::Script {
                metrics, script, ..
            } => commands::publish::script(PublishScriptOptions {
                metrics: metrics.clone(),
                target: script_target(script),
            }),
        },
        Commands::Codes { command } => match command {
            CodesCommand::Check { input, .. } => commands::codes::check(input),
        },
    }
}

fn normalize_options(
    io: &TableArgs,
    mode: MetricMode,
    source: ReferenceSource,
    script: &ScriptArgs,
) -> NormalizeOptions {
    NormalizeOptions {
        input: io.input.clone(),
        output: io.output.clone(),
        mode,
        source,
        script: script.is_requested().then(|| script_target(script)),
    }
}

fn remote_options(remote: &RemoteArgs) -> RemoteOptions {
    RemoteOptions {
        kind: remote.strategy.into(),
        api_base: remote.api_base.trim_end_matches('/').to_string(),
        bulk_url: remote.bulk_url.clone(),
        pacing: Duration::from_millis(remote.pace_ms),
    }
}

fn script_target(script: &ScriptArgs) -> ScriptTarget {
    ScriptTarget {
        host: script.host.clone(),
        declaration: script.declaration.clone(),
        years: script.years.clone(),
        snippet_out: script.snippet_out.clone(),
    }
}
