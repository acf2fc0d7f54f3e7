use anyhow::bail;

use crate::cli::{utils::output_success, OutputFormat};
use crate::config::{AppConfig, Backend};
use crate::database::DatabaseManager;

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    if config.database.backend()? != Backend::Postgres {
        bail!("migrations need a postgres DATABASE_URL, got {}", config.database.redacted_url());
    }

    let pool = DatabaseManager::pool(&config.database).await?;
    DatabaseManager::migrate(&pool).await?;

    output_success(
        output_format,
        &format!("Migrations applied to {}", config.database.redacted_url()),
        None,
    )
}
