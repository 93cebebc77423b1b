use crate::credential::KdfParams;
use clap::{Arg, ArgMatches, Command};

pub const ARG_SCRYPT_LOG_N: &str = "scrypt-log-n";
pub const ARG_SCRYPT_R: &str = "scrypt-r";
pub const ARG_SCRYPT_P: &str = "scrypt-p";

/// Parse scrypt cost arguments, falling back to [`KdfParams::default`].
#[must_use]
pub fn parse(matches: &ArgMatches) -> KdfParams {
    let defaults = KdfParams::default();

    KdfParams::new(
        matches
            .get_one::<u8>(ARG_SCRYPT_LOG_N)
            .copied()
            .unwrap_or(defaults.log_n),
        matches
            .get_one::<u32>(ARG_SCRYPT_R)
            .copied()
            .unwrap_or(defaults.r),
        matches
            .get_one::<u32>(ARG_SCRYPT_P)
            .copied()
            .unwrap_or(defaults.p),
    )
}

// Credentials do not record their parameters; changing these invalidates every
// stored credential. The ranges are coarse, `CredentialManager::new` enforces the
// combined memory limit at startup.
#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_SCRYPT_LOG_N)
                .long(ARG_SCRYPT_LOG_N)
                .help("scrypt CPU/memory cost as log2(N)")
                .default_value("14")
                .env("SIGIL_SCRYPT_LOG_N")
                .value_parser(clap::value_parser!(u8).range(1..=22)),
        )
        .arg(
            Arg::new(ARG_SCRYPT_R)
                .long(ARG_SCRYPT_R)
                .help("scrypt block size")
                .default_value("8")
                .env("SIGIL_SCRYPT_R")
                .value_parser(clap::value_parser!(u32).range(1..=1024)),
        )
        .arg(
            Arg::new(ARG_SCRYPT_P)
                .long(ARG_SCRYPT_P)
                .help("scrypt parallelization")
                .default_value("1")
                .env("SIGIL_SCRYPT_P")
                .value_parser(clap::value_parser!(u32).range(1..=16)),
        )
}
