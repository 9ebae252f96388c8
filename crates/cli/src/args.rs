//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::config::OutputFormat;

/// Terminal client for the pipelines / stages / negotiations board
#[derive(Parser, Debug)]
#[command(name = "dealboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (default: .dealboard/config.toml)
    #[arg(short, long, global = true, env = "DEALBOARD_CONFIG")]
    pub config: Option<PathBuf>,

    /// API base URL, overrides the configuration file
    #[arg(long, global = true, env = "DEALBOARD_BASE_URL")]
    pub base_url: Option<String>,

    /// Output format, overrides the configuration file
    #[arg(long, global = true, value_enum)]
    pub format: Option<OutputFormat>,

    /// Mark board branches whose fetch failed instead of showing them empty
    #[arg(long, global = true)]
    pub show_branch_failures: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Authenticate and store the issued token
    Login {
        #[arg(long)]
        account_id: String,
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        user_email: String,
        #[arg(long)]
        user_name: String,
    },

    /// Forget the stored token
    Logout,

    /// Show pipelines with their stages and negotiations
    Board,

    /// List pipeline names
    Pipelines,

    /// Create a pipeline, then list pipelines
    CreatePipeline {
        /// Name of the new pipeline
        name: String,
    },

    /// Dump the raw pipeline collection
    Dashboard,

    /// Dump the raw user list (super admins only)
    Admin,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    // https://docs.rs/clap/latest/clap/_derive/_tutorial/index.html#testing
    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_follow_subcommand() {
        let cli = Cli::try_parse_from([
            "dealboard",
            "board",
            "--base-url",
            "http://crm.local",
            "-vv",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.command, Commands::Board);
        assert_eq!(cli.base_url.as_deref(), Some("http://crm.local"));
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.format, Some(OutputFormat::Json));
    }

    #[test]
    fn login_requires_identity() {
        assert!(Cli::try_parse_from(["dealboard", "login", "--user-id", "1"]).is_err());
    }
}
