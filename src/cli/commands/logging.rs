use clap::{builder::ValueParser, Arg, ArgAction, Command};

pub const ARG_VERBOSITY: &str = "verbosity";

/// Level names in verbosity order: `-v` count 0 logs errors only, 4 logs everything.
pub const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

/// Parse `SIGIL_LOG_LEVEL`: a level name from [`LEVELS`] or its index.
fn parse_level(level: &str) -> Result<u8, String> {
    let level = level.trim().to_lowercase();

    LEVELS
        .iter()
        .position(|name| *name == level)
        .or_else(|| level.parse::<usize>().ok().filter(|n| *n < LEVELS.len()))
        .and_then(|index| u8::try_from(index).ok())
        .ok_or_else(|| format!("expected one of {} or 0-4", LEVELS.join(", ")))
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command.arg(
        Arg::new(ARG_VERBOSITY)
            .short('v')
            .long("verbose")
            .help("Log more: -v warn, -vv info, -vvv debug, -vvvv trace (default: error)")
            .long_help(
                "Log more: -v warn, -vv info, -vvv debug, -vvvv trace. Errors are always logged. SIGIL_LOG_LEVEL takes a level name (error, warn, info, debug, trace) or 0-4 instead of repeating -v. RUST_LOG directives still override either.",
            )
            .env("SIGIL_LOG_LEVEL")
            .global(true)
            .action(ArgAction::Count)
            .value_parser(ValueParser::from(parse_level)),
    )
}
