mod cli;
mod dispatch;
mod logging;
mod output;
mod stdout_io;

use std::process::ExitCode;

use clap::{Parser, error::ErrorKind};
use payintensity_client::ClientError;
use stdout_io::write_stdout_text;

const ROOT_HELP: &str = "payintensity - payment transaction intensity by GDP or population

Usage:
  payintensity <command>

Start here:
  payintensity codes check <transactions.csv>
  payintensity normalize gdp --help
  payintensity normalize per-capita --help
";

const TOP_LEVEL_HELP: &str = "payintensity: payment transaction intensity by GDP or population

USAGE: payintensity <command>

Derive a metric table:
  payintensity normalize gdp --input <csv> --output <csv>           Transaction value as % of GDP
  payintensity normalize per-capita --input <csv> --output <csv>    Transaction value per person

Publish to a web page:
  payintensity normalize ... --host <page>                          Derive, then splice into the page
  payintensity publish script --metrics <csv> --host <page>         Splice an existing metric table

Check inputs:
  payintensity codes check <csv>                                    List countries without a country code

Every command accepts --json for machine-readable output and -v for progress logs.
Run `payintensity <command> --help` for command usage.
";

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(code) => code,
    }
}

fn run() -> Result<ExitCode, ExitCode> {
    let raw_args = std::env::args().collect::<Vec<String>>();
    if raw_args.len() == 1 {
        if write_stdout_text(ROOT_HELP).is_err() {
            return Err(ExitCode::from(2));
        }
        return Ok(ExitCode::SUCCESS);
    }
    let parsed = cli::Cli::try_parse();
    let cli = match parsed {
        Ok(value) => value,
        Err(err) => {
            if matches!(
                err.kind(),
                ErrorKind::DisplayHelp
                    | ErrorKind::DisplayVersion
                    | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
            ) {
                let text = if is_top_level_help_request(&raw_args) {
                    TOP_LEVEL_HELP.to_string()
                } else {
                    err.to_string()
                };
                if write_stdout_text(&text).is_err() {
                    return Err(ExitCode::from(2));
                }
                return Ok(ExitCode::SUCCESS);
            }
            let clean_message = strip_clap_boilerplate(&err.to_string());
            let parse_error = ClientError::invalid_argument_for_command(
                &clean_message,
                command_path_from_args(&raw_args).as_deref(),
            );
            let mode = infer_requested_output_mode(&raw_args);
            if output::print_failure(&parse_error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            return Err(ExitCode::from(1));
        }
    };
    logging::init_logging(cli.verbose);
    let mode = output::mode_for_command(&cli.command);

    match dispatch::dispatch(&cli) {
        Ok(success) => {
            if output::print_success(&success, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(error) => {
            if output::print_failure(&error, mode).is_err() {
                return Err(ExitCode::from(2));
            }
            Err(exit_code_for_error(&error))
        }
    }
}

fn is_top_level_help_request(raw_args: &[String]) -> bool {
    raw_args.len() == 2 && matches!(raw_args[1].as_str(), "--help" | "-h")
}

// Drops clap's trailing usage and "For more information" lines.
fn strip_clap_boilerplate(message: &str) -> String {
    let trimmed = if let Some(pos) = message.find("\n\nUsage:") {
        &message[..pos]
    } else if let Some(pos) = message.find("\nFor more information") {
        &message[..pos]
    } else {
        message
    };
    trimmed.trim_start_matches("error: ").trim_end().to_string()
}

fn command_path_from_args(raw_args: &[String]) -> Option<String> {
    let words = raw_args
        .iter()
        .skip(1)
        .filter(|value| !value.starts_with('-'))
        .map(String::as_str)
        .collect::<Vec<&str>>();

    let hint = match words.as_slice() {
        ["normalize", "gdp", ..] => "normalize gdp",
        ["normalize", "per-capita", ..] => "normalize per-capita",
        ["normalize", ..] => "normalize",
        ["publish", "script", ..] => "publish script",
        ["publish", ..] => "publish",
        ["codes", "check", ..] => "codes check",
        ["codes", ..] => "codes",
        _ => return None,
    };
    Some(hint.to_string())
}

fn exit_code_for_error(error: &ClientError) -> ExitCode {
    if error.is_internal() {
        ExitCode::from(2)
    } else {
        ExitCode::from(1)
    }
}

fn infer_requested_output_mode(raw_args: &[String]) -> output::OutputMode {
    if raw_args.iter().skip(1).any(|value| value == "--json") {
        return output::OutputMode::Json;
    }
    output::OutputMode::Text
}

#[cfg(test)]
mod tests {
    use super::{command_path_from_args, is_top_level_help_request, strip_clap_boilerplate};

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn command_hint_follows_known_subcommands() {
        assert_eq!(
            command_path_from_args(&args(&["payintensity", "normalize", "per-capita", "--bogus"])),
            Some("normalize per-capita".to_string())
        );
        assert_eq!(
            command_path_from_args(&args(&["payintensity", "codes", "check", "in.csv"])),
            Some("codes check".to_string())
        );
        assert_eq!(command_path_from_args(&args(&["payintensity", "import"])), None);
    }

    #[test]
    fn clap_boilerplate_is_removed() {
        let message = "error: unexpected argument '--bogus' found\n\nUsage: payintensity codes check <INPUT>\n\nFor more information, try '--help'.\n";
        assert_eq!(
            strip_clap_boilerplate(message),
            "unexpected argument '--bogus' found"
        );
    }

    #[test]
    fn only_bare_help_is_top_level() {
        assert!(is_top_level_help_request(&args(&["payintensity", "--help"])));
        assert!(!is_top_level_help_request(&args(&["payintensity", "codes", "--help"])));
    }
}
