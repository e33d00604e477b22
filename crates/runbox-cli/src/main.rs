//! runbox — run one source file through the sandboxed executor
//!
//! Usage:
//!   runbox main.go
//!   runbox main.go --input input.txt --timeout 30

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use runbox_core::{CodeExecutor, DockerLauncher, ExecError, ExecutorConfig, Language};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "runbox", about = "Run untrusted code in an isolated Docker sandbox")]
struct Args {
    /// Source file to execute
    file: PathBuf,

    /// File piped to the program's stdin
    #[arg(long)]
    input: Option<PathBuf>,

    /// Wall-clock timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,

    /// Sandbox image reference
    #[arg(long)]
    image: Option<String>,

    /// Workspace staging root
    #[arg(long)]
    base_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let source_code = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let input = match &args.input {
        Some(path) => Some(
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
        ),
        None => None,
    };

    let mut config = ExecutorConfig::from_env();
    if let Some(secs) = args.timeout {
        config.timeout_secs = secs;
    }
    if let Some(image) = args.image {
        config.image = image;
    }
    if let Some(base_dir) = args.base_dir {
        config.base_dir = base_dir;
    }

    let launcher = Arc::new(DockerLauncher::new());
    if !launcher.is_available().await {
        anyhow::bail!("docker is not available on this host");
    }

    info!(image = %config.image, timeout_secs = config.timeout_secs, "executing");
    let executor = CodeExecutor::new(config, launcher);

    let result = match input {
        Some(input) => {
            executor
                .execute_with_stdin(&source_code, Language::Go, &input)
                .await
        }
        None => executor.execute(&source_code, Language::Go).await,
    };

    match result {
        Ok(result) => {
            print!("{}", result.stdout);
            std::io::stdout().flush().ok();
            if !result.stderr.is_empty() {
                eprint!("{}", result.stderr);
                std::io::stderr().flush().ok();
            }
            // warnings on stderr alone do not fail the run
            if !result.exit_ok {
                std::process::exit(1);
            }
            Ok(())
        }
        Err(ExecError::Timeout(limit)) => {
            eprintln!("execution timed out after {limit:?}");
            std::process::exit(2);
        }
        Err(e) => Err(e.into()),
    }
}
