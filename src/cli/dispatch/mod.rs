//! Map validated CLI matches to an [`Action`].

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{kdf, ARG_DSN, ARG_PORT};
use anyhow::{anyhow, Context, Result};
use url::Url;

/// # Errors
/// Returns an error if the DSN is not a PostgreSQL URL.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);

    let dsn = matches
        .get_one::<String>(ARG_DSN)
        .filter(|dsn| !dsn.trim().is_empty())
        .map(String::as_str)
        .map(validate_dsn)
        .transpose()?;

    Ok(Action::Server(Args {
        port,
        dsn,
        kdf: kdf::parse(matches),
    }))
}

fn validate_dsn(dsn: &str) -> Result<String> {
    let url = Url::parse(dsn).context("invalid SIGIL_DSN")?;

    match url.scheme() {
        "postgres" | "postgresql" => Ok(dsn.to_string()),
        scheme => Err(anyhow!("unsupported DSN scheme: {scheme}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credential::KdfParams;

    fn dispatch(args: &[&str]) -> Result<Action> {
        let matches = crate::cli::commands::new().get_matches_from(args);
        handler(&matches)
    }

    #[test]
    fn test_memory_directory_without_dsn() {
        temp_env::with_vars([("SIGIL_DSN", None::<&str>)], || {
            let action = dispatch(&["sigil", "--port", "9000"]);
            assert!(matches!(
                action,
                Ok(Action::Server(Args {
                    port: 9000,
                    dsn: None,
                    ..
                }))
            ));
        });
    }

    #[test]
    fn test_postgres_dsn() {
        let action = dispatch(&[
            "sigil",
            "--dsn",
            "postgresql://sigil@localhost:5432/sigil",
            "--scrypt-log-n",
            "10",
        ]);
        match action {
            Ok(Action::Server(args)) => {
                assert_eq!(
                    args.dsn.as_deref(),
                    Some("postgresql://sigil@localhost:5432/sigil")
                );
                assert_eq!(args.kdf, KdfParams::new(10, 8, 1));
            }
            Err(err) => panic!("unexpected error: {err}"),
        }
    }

    #[test]
    fn test_invalid_dsn() {
        let result = dispatch(&["sigil", "--dsn", "mysql://localhost/sigil"]);
        assert!(result.is_err());
        if let Err(err) = result {
            assert!(err.to_string().contains("unsupported DSN scheme: mysql"));
        }

        assert!(dispatch(&["sigil", "--dsn", "not a url"]).is_err());
    }
}
