use std::io::Read;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use codify_codegen::{assemble, AliasResolver, KindAdapter, ProgramValues, RuntimeSource};
use codify_core::{AliasTable, ResourceObject};
use codify_manifest::LoadOptions;
use codify_runtime::{Encoding, Registry};
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "codifyctl", version, about = "Turn Kubernetes manifests into Rust programs")]
struct Cli {
    /// Namespace forced onto every namespaced object
    #[arg(long = "ns", global = true)]
    namespace: Option<String>,

    /// Skip documents whose kind has no codegen support
    #[arg(long = "skip-unsupported", global = true, action = ArgAction::SetTrue)]
    skip_unsupported: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a program that installs and uninstalls the given objects
    Generate {
        /// Manifest files (YAML or JSON); `-` reads stdin
        #[arg(required = true)]
        files: Vec<String>,
        /// Application and package name
        #[arg(long = "name", default_value = "app")]
        name: String,
        #[arg(long = "description", default_value = "")]
        description: String,
        /// `Name <email>`
        #[arg(long = "author", env = "CODIFY_AUTHOR")]
        author: Option<String>,
        #[arg(long = "year")]
        year: Option<String>,
        /// Write a Cargo project here instead of printing main.rs
        #[arg(long = "out-dir")]
        out_dir: Option<PathBuf>,
        /// Path to the codify-runtime crate for the generated Cargo.toml
        ///
        /// Defaults to the runtime crate this codifyctl was built from.
        #[arg(long = "runtime-path", conflicts_with = "runtime_version")]
        runtime_path: Option<String>,
        /// Depend on a published codify-runtime release instead of a path
        #[arg(long = "runtime-version")]
        runtime_version: Option<String>,
    },
    /// Print the alias-resolved literal of each object
    Literal {
        #[arg(required = true)]
        files: Vec<String>,
    },
    /// Dry-run install the objects and render the resulting registry
    Render {
        #[arg(required = true)]
        files: Vec<String>,
        #[arg(short = 'o', long = "output", value_enum, default_value_t = Encoding::Display)]
        output: Encoding,
    },
}

fn init_tracing() {
    let env = std::env::var("CODIFY_LOG").unwrap_or_else(|_| "info".to_string());
    let filter = tracing_subscriber::EnvFilter::from_str(&env).unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}

fn init_metrics() {
    if let Ok(addr) = std::env::var("CODIFY_METRICS_ADDR") {
        if let Ok(sock) = addr.parse::<std::net::SocketAddr>() {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            match builder.with_http_listener(sock).install() {
                Ok(_) => tracing::info!(addr = %addr, "Prometheus metrics exporter listening"),
                Err(e) => tracing::warn!(error = %e, "failed to install metrics exporter"),
            }
        } else {
            tracing::warn!(addr = %addr, "invalid CODIFY_METRICS_ADDR; expected host:port");
        }
    }
}

fn read_input(file: &str) -> Result<String> {
    if file == "-" {
        let mut text = String::new();
        std::io::stdin().read_to_string(&mut text).context("reading stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(file).with_context(|| format!("reading {file}"))
}

fn load_objects(files: &[String], opts: &LoadOptions) -> Result<Vec<ResourceObject>> {
    let mut objects = Vec::new();
    for file in files {
        let loaded = codify_manifest::load_with(&read_input(file)?, opts).with_context(|| format!("loading {file}"))?;
        for s in &loaded.skipped {
            warn!(file = %file, kind = %s.kind, name = %s.name, "skipped");
        }
        objects.extend(loaded.objects);
    }
    info!(files = files.len(), objects = objects.len(), "manifests loaded");
    Ok(objects)
}

/// `Jo Doe <jo@example.com>` -> (`Jo Doe`, `jo@example.com`).
fn parse_author(author: &str) -> (String, Option<String>) {
    match author.split_once('<') {
        Some((name, rest)) if rest.trim_end().ends_with('>') => {
            let email = rest.trim_end().trim_end_matches('>').trim();
            (name.trim().to_string(), Some(email.to_string()).filter(|e| !e.is_empty()))
        }
        _ => (author.trim().to_string(), None),
    }
}

fn write_project(dir: &Path, cargo_toml: &str, main_rs: &str) -> Result<()> {
    let src = dir.join("src");
    std::fs::create_dir_all(&src).with_context(|| format!("creating {}", src.display()))?;
    std::fs::write(dir.join("Cargo.toml"), cargo_toml).with_context(|| format!("writing {}/Cargo.toml", dir.display()))?;
    std::fs::write(src.join("main.rs"), main_rs).with_context(|| format!("writing {}", src.join("main.rs").display()))?;
    Ok(())
}

fn literals(objects: &[ResourceObject], table: &AliasTable) -> Result<String> {
    let resolver = AliasResolver::new(table);
    let mut out = String::new();
    for obj in objects {
        let adapter = KindAdapter::new(obj);
        let codified = adapter.codify().with_context(|| format!("codifying {} ({})", obj.key(), obj.kind()))?;
        let resolved = resolver.resolve(&codified.source, adapter.kind_spec().default_alias)?;
        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("// {} ({})\n{}\n", obj.key(), obj.kind(), resolved.trim_end()));
    }
    Ok(out)
}

/// Register each object the way its install fragment would, failing on any
/// object whose literal would not rebuild it.
fn dry_run(objects: &[ResourceObject]) -> Result<Registry> {
    let mut registry = Registry::new();
    for obj in objects {
        let adapter = KindAdapter::new(obj);
        let codified = adapter.codify().with_context(|| format!("codifying {} ({})", obj.key(), obj.kind()))?;
        registry.push(codified.object.clone());
    }
    Ok(registry)
}

fn runtime_source(path: Option<String>, version: Option<String>) -> RuntimeSource {
    match (path, version) {
        (Some(p), _) => RuntimeSource::Path(p),
        (None, Some(v)) => RuntimeSource::Version(v),
        (None, None) => RuntimeSource::workspace(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    init_metrics();
    let cli = Cli::parse();
    let opts = LoadOptions { namespace: cli.namespace.clone(), skip_unsupported: cli.skip_unsupported };
    let table = AliasTable::kubernetes();

    match cli.command {
        Commands::Generate { files, name, description, author, year, out_dir, runtime_path, runtime_version } => {
            let objects = load_objects(&files, &opts)?;
            if objects.is_empty() {
                bail!("no objects to generate code for");
            }
            let (author_name, author_email) = match author.as_deref().map(parse_author) {
                Some((n, e)) => (Some(n), e),
                None => (None, None),
            };
            let values = ProgramValues {
                app_name: name.to_lowercase(),
                description,
                author_name,
                author_email,
                copyright_year: year,
                runtime: runtime_source(runtime_path, runtime_version),
            };
            let program = assemble(&objects, &values, &table)?;
            match out_dir {
                Some(dir) => {
                    write_project(&dir, &program.cargo_toml, &program.main_rs)?;
                    info!(dir = %dir.display(), fragments = program.fragments.len(), "project written");
                }
                None => print!("{}", program.main_rs),
            }
        }
        Commands::Literal { files } => {
            let objects = load_objects(&files, &opts)?;
            print!("{}", literals(&objects, &table)?);
        }
        Commands::Render { files, output } => {
            let objects = load_objects(&files, &opts)?;
            let registry = dry_run(&objects)?;
            print!("{}", codify_runtime::render(&registry, output, &table)?);
        }
    }
    Ok(())
}
