use clap::Args;
use serde_json::json;
use uuid::Uuid;

use crate::auth::{generate_jwt, Claims};
use crate::cli::{utils::output_success, OutputFormat};
use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct TokenArgs {
    #[arg(long, help = "User id to place in the token subject")]
    pub user_id: Uuid,

    #[arg(long, help = "Grant the admin claim")]
    pub admin: bool,
}

pub async fn handle(args: TokenArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;

    let security = &config.security;
    let claims = Claims::new(args.user_id, args.admin, security);
    let token = generate_jwt(&claims, security)?;

    match output_format {
        // Bare token so it can be captured by a shell
        OutputFormat::Text => println!("{}", token),
        OutputFormat::Json => output_success(
            output_format,
            "Token generated",
            Some(json!({
                "token": token,
                "header": security.token_header,
                "isAdmin": args.admin,
                "expiresIn": security.jwt_expiry_hours * 3600,
            })),
        )?,
    }
    Ok(())
}
