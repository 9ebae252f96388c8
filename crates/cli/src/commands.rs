//! Subcommand dispatch.
//!
//! Each subcommand is one "view": it builds an [`HttpApiClient`] from the
//! stored credential, asks the `board` crate for a [`VisualStructure`], and
//! prints it. A view that renders the failure indication exits non-zero.

use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use api_client::HttpApiClient;
use board::views::{create_and_list, pipeline_list, raw_dump};
use board::{
    render_board, render_failure, ApiPath, AuthContext, BoardAggregator, LoginRequest,
    RenderOptions, VisualStructure,
};
use tracing::{info, instrument, warn};

use crate::args::{Cli, Commands};
use crate::config::{CliConfig, OutputFormat};
use crate::credentials::CredentialStore;

pub async fn execute(cli: &Cli, config: &CliConfig) -> Result<ExitCode> {
    let store = CredentialStore::resolve(config.credentials_path.as_deref())?;

    match &cli.command {
        Commands::Login {
            account_id,
            user_id,
            user_email,
            user_name,
        } => {
            let login = LoginRequest {
                account_id: account_id.clone(),
                user_id: user_id.clone(),
                user_email: user_email.clone(),
                user_name: user_name.clone(),
            };
            login_cmd(config, &store, &login).await
        }
        Commands::Logout => {
            store.clear()?;
            println!("Logged out");
            Ok(ExitCode::SUCCESS)
        }
        Commands::Board => {
            let client = authenticated_client(config, &store)?;
            emit(&board_view(&client, config).await, config.output_format)
        }
        Commands::Pipelines => {
            let client = authenticated_client(config, &store)?;
            emit(&pipeline_list(&client).await, config.output_format)
        }
        Commands::CreatePipeline { name } => {
            let client = authenticated_client(config, &store)?;
            let Some(view) = create_and_list(&client, name).await else {
                bail!("pipeline name must not be empty");
            };
            emit(&view, config.output_format)
        }
        Commands::Dashboard => {
            let client = authenticated_client(config, &store)?;
            emit(
                &raw_dump(&client, &ApiPath::pipelines()).await,
                config.output_format,
            )
        }
        Commands::Admin => {
            let client = authenticated_client(config, &store)?;
            emit(
                &raw_dump(&client, &ApiPath::admin_users()).await,
                config.output_format,
            )
        }
    }
}

fn authenticated_client(config: &CliConfig, store: &CredentialStore) -> Result<HttpApiClient> {
    let token = store.load()?;
    if token.is_none() {
        info!("no stored token, sending requests unauthenticated");
    }
    HttpApiClient::new(&config.base_url, AuthContext::from(token))
        .context("failed to construct API client")
}

#[instrument(skip_all)]
async fn board_view(client: &HttpApiClient, config: &CliConfig) -> VisualStructure {
    let options = RenderOptions {
        surface_branch_failures: config.surface_branch_failures,
    };
    match BoardAggregator::new(client).build_board().await {
        Ok(tree) => render_board(&tree, options),
        Err(e) => {
            warn!(error = %e, "board unavailable");
            render_failure()
        }
    }
}

#[instrument(skip_all, fields(user_id = %login.user_id))]
async fn login_cmd(
    config: &CliConfig,
    store: &CredentialStore,
    login: &LoginRequest,
) -> Result<ExitCode> {
    let client = HttpApiClient::new(&config.base_url, AuthContext::anonymous())
        .context("failed to construct API client")?;

    match client.login(login).await {
        Ok(token) => {
            store.save(&token)?;
            info!(path = %store.path().display(), "token stored");
            println!("Logged in");
            Ok(ExitCode::SUCCESS)
        }
        Err(failure) => {
            warn!(reason = failure.reason(), error = %failure, "login rejected");
            eprintln!("Login failed");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Formats `view` for stdout.
pub fn format_view(view: &VisualStructure, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(view.to_string()),
        OutputFormat::Json => {
            let mut text = serde_json::to_string_pretty(view)?;
            text.push('\n');
            Ok(text)
        }
    }
}

fn emit(view: &VisualStructure, format: OutputFormat) -> Result<ExitCode> {
    print!("{}", format_view(view, format)?);
    if matches!(view, VisualStructure::Failure(_)) {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use board::{render_names, Pipeline, PipelineId};
    use tempfile::TempDir;

    #[test]
    fn text_and_json_output() {
        let view = render_names(&[]);
        assert_eq!(format_view(&view, OutputFormat::Text).unwrap(), "");

        let failure = render_failure();
        assert_eq!(
            format_view(&failure, OutputFormat::Text).unwrap(),
            "Failed to load\n"
        );

        let json: serde_json::Value =
            serde_json::from_str(&format_view(&failure, OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["kind"], "failure");
        assert_eq!(json["content"], "Failed to load");
    }

    #[test]
    fn failure_view_exits_non_zero() {
        assert_eq!(
            emit(&render_failure(), OutputFormat::Text).unwrap(),
            ExitCode::FAILURE
        );
        assert_eq!(
            emit(&render_failure(), OutputFormat::Json).unwrap(),
            ExitCode::FAILURE
        );

        let names = [Pipeline {
            id: PipelineId::new(1),
            name: "Sales".to_string(),
        }];
        assert_eq!(
            emit(&render_names(&names), OutputFormat::Text).unwrap(),
            ExitCode::SUCCESS
        );
        assert_eq!(
            emit(&render_names(&[]), OutputFormat::Text).unwrap(),
            ExitCode::SUCCESS
        );
    }

    #[tokio::test]
    async fn rejected_login_exits_non_zero_and_stores_nothing() {
        // Bind then drop, so the port refuses connections.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let dir = TempDir::new().unwrap();
        let store = CredentialStore::new(dir.path().join("credentials.json"));
        let config = CliConfig {
            base_url: format!("http://{addr}"),
            ..CliConfig::default()
        };
        let login = LoginRequest {
            account_id: "1".to_string(),
            user_id: "2".to_string(),
            user_email: "a@example.com".to_string(),
            user_name: "Ann".to_string(),
        };

        let code = login_cmd(&config, &store, &login).await.unwrap();

        assert_eq!(code, ExitCode::FAILURE);
        assert!(store.load().unwrap().is_none());
    }
}
