use crate::{
    api,
    auth::AuthService,
    cli::telemetry,
    credential::{CredentialManager, KdfParams},
    directory::{MemoryDirectory, PgDirectory, UserDirectory},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub dsn: Option<String>,
    pub kdf: KdfParams,
}

/// Build the user directory selected by `dsn`.
///
/// # Errors
/// Returns an error if the PostgreSQL directory cannot be reached.
pub async fn directory(dsn: Option<&str>) -> Result<Arc<dyn UserDirectory>> {
    if let Some(dsn) = dsn {
        let directory = PgDirectory::connect(dsn).await?;
        info!("Using PostgreSQL user directory");
        Ok(Arc::new(directory))
    } else {
        warn!("No DSN configured, users are kept in memory and lost on restart");
        Ok(Arc::new(MemoryDirectory::new()))
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the scrypt parameters are invalid, the directory is unreachable,
/// or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let credentials = CredentialManager::new(args.kdf).context("Invalid scrypt parameters")?;

    info!(
        log_n = args.kdf.log_n,
        r = args.kdf.r,
        p = args.kdf.p,
        "scrypt parameters"
    );

    let directory = directory(args.dsn.as_deref()).await?;

    let auth = Arc::new(AuthService::new(directory, credentials));

    let result = api::new(args.port, auth).await;

    telemetry::shutdown_tracer();

    result
}
