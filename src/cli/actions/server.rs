use crate::cli::{actions::Action, globals::GlobalArgs};
use crate::clientele::new;
use anyhow::{Context, Result};
use tracing::info;
use url::Url;

/// Handle the server action
///
/// # Errors
///
/// Returns an error if the DSN is not a valid URL or the server fails to start
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    match action {
        Action::Server { port, dsn } => {
            // Fail early on a malformed DSN; log the target host, never the
            // embedded credentials.
            let url = Url::parse(&dsn).context("invalid database DSN")?;

            info!(
                host = url.host_str().unwrap_or("unknown"),
                "Connecting to database"
            );

            new(port, dsn, globals).await?;
        }
    }

    Ok(())
}
