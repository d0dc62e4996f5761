//! autodeployer - release candidates and deployment bumps
//!
//! CLI binary for cutting a release and rolling it out to a deployment repository.

use anstream::eprintln;
use anyhow::Result;
use autodeployer::version::ChangeClass;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod cli;

use cli::style::Stylize;

/// Environment variable holding the log filter
const LOG_ENV: &str = "AUTODEPLOYER_LOG";

/// Exit code reported when the user interrupts a run
const INTERRUPTED: u8 = 130;

#[derive(Parser)]
#[command(name = "autodeployer")]
#[command(about = "Cut a release candidate and bump it into a deployment repository")]
#[command(version)]
struct Cli {
    /// Path to config.yaml (defaults to ./config.yaml, then the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Release a repository and bump the new tag into its deployment
    Deploy {
        /// Repository to release (name, owner/name, or URL)
        repo: String,

        /// Branch to release from
        branch: String,

        /// Baseline tag to increment instead of looking one up
        #[arg(long)]
        old_tag: Option<String>,

        /// Kind of version change
        #[arg(long, default_value_t = ChangeClass::Minor)]
        change: ChangeClass,

        /// Input passed to the deploy workflow (repeatable)
        #[arg(short, long = "input", value_name = "KEY=VALUE", value_parser = cli::parse_input)]
        inputs: Vec<(String, String)>,

        /// Dry run - show what would be done without making changes
        #[arg(long)]
        dry_run: bool,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,

        /// Abort the whole run after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Print the tag that follows TAG
    NextTag {
        /// Current tag
        tag: String,

        /// Kind of version change
        #[arg(long, default_value_t = ChangeClass::Minor)]
        change: ChangeClass,
    },

    /// Authentication management
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Test authentication
    Test,
    /// Show authentication setup instructions
    Setup,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli.config.as_deref();

    match cli.command {
        Commands::Deploy {
            repo,
            branch,
            old_tag,
            change,
            inputs,
            dry_run,
            yes,
            timeout,
        } => {
            let options = cli::DeployOptions {
                repo,
                branch,
                old_tag,
                change,
                inputs,
                dry_run,
                assume_yes: yes,
                timeout: timeout.map(std::time::Duration::from_secs),
            };
            cli::run_deploy(config, &options).await?;
        }
        Commands::NextTag { tag, change } => {
            cli::run_next_tag(&tag, change)?;
        }
        Commands::Auth { action } => match action {
            AuthAction::Test => cli::run_auth_test(config).await?,
            AuthAction::Setup => cli::run_auth_setup(),
        },
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let outcome = tokio::select! {
        result = run(cli) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("\n{}", "Interrupted".warn());
            return ExitCode::from(INTERRUPTED);
        }
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}: {e:#}", "error".error());
            ExitCode::FAILURE
        }
    }
}
