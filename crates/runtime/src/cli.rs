//! Command line of a generated program.

use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codify_core::AliasTable;
use tracing::info;

use crate::render::{render, Encoding};
use crate::Deployable;

#[derive(Parser, Debug)]
#[command(about = "Install, uninstall or inspect the objects of this application")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create every object in the cluster
    Install {
        /// Only populate the registry; no API calls
        #[arg(long = "dry-run", action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Delete every object from the cluster
    Uninstall {
        #[arg(long = "dry-run", action = ArgAction::SetTrue)]
        dry_run: bool,
    },
    /// Print the objects without touching the cluster
    Output {
        #[arg(short = 'o', long = "output", value_enum, default_value_t = Encoding::Display)]
        output: Encoding,
    },
    /// Print the application metadata as JSON
    Meta,
}

fn init_tracing() {
    let env = std::env::var("CODIFY_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    // A host process may already own the global subscriber.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

async fn client(dry_run: bool) -> Result<Option<kube::Client>> {
    if dry_run {
        return Ok(None);
    }
    let client = kube::Client::try_default().await.context("connecting to the cluster")?;
    Ok(Some(client))
}

/// Entry point of a generated program: parse `std::env::args` and run.
pub async fn run_command_line<D: Deployable>(app: D) -> Result<()> {
    init_tracing();
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run_with_args(app, std::env::args_os(), &mut out).await
}

/// Like [`run_command_line`] with explicit arguments (the first is the program name) and output.
pub async fn run_with_args<D, I, T>(mut app: D, args: I, out: &mut dyn Write) -> Result<()>
where
    D: Deployable,
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        // --help and --version
        Err(e) if !e.use_stderr() => {
            write!(out, "{e}")?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    let name = app.meta().name.clone().unwrap_or_default();
    match cli.command {
        Command::Install { dry_run } => {
            let client = client(dry_run).await?;
            info!(app = %name, dry_run, "installing");
            app.install(client.as_ref()).await.with_context(|| format!("installing {name}"))?;
            info!(app = %name, objects = app.registry().len(), "installed");
        }
        Command::Uninstall { dry_run } => {
            let client = client(dry_run).await?;
            info!(app = %name, dry_run, "uninstalling");
            app.uninstall(client.as_ref()).await.with_context(|| format!("uninstalling {name}"))?;
        }
        Command::Output { output } => {
            app.install(None).await.with_context(|| format!("collecting objects of {name}"))?;
            let text = render(app.registry(), output, &AliasTable::kubernetes())?;
            out.write_all(text.as_bytes())?;
        }
        Command::Meta => {
            writeln!(out, "{}", serde_json::to_string_pretty(app.meta())?)?;
        }
    }
    Ok(())
}
