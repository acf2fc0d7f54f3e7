use anyhow::{bail, Context};
use clap::Args;
use serde_json::Value;
use std::time::Duration;

use crate::cli::{utils::output_success, OutputFormat};

#[derive(Debug, Args)]
pub struct HealthArgs {
    #[arg(long, default_value = "http://localhost:3000", help = "Base URL of the server")]
    pub url: String,
}

pub async fn handle(args: HealthArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let endpoint = format!("{}/health", args.url.trim_end_matches('/'));

    let client = reqwest::Client::builder().timeout(Duration::from_secs(5)).build()?;
    let response = client
        .get(&endpoint)
        .send()
        .await
        .with_context(|| format!("failed to reach {}", endpoint))?;

    let status = response.status();
    let body: Value = response.json().await.unwrap_or(Value::Null);

    if !status.is_success() {
        bail!("{} responded {}: {}", endpoint, status, body);
    }

    output_success(output_format, &format!("{} is healthy", args.url), body.get("data").cloned())
}
