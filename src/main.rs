use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use paramsync::cli::{Cli, Command};
use paramsync::manifest::{self, FileDescriptor};
use paramsync::session::{sync_recv, sync_send, SyncOptions};
use paramsync::transport::Listener;
use paramsync::SyncStats;
use tracing_subscriber::EnvFilter;

fn print_listing(header: &str, files: &[FileDescriptor]) {
    println!("{}", header.bold());
    for f in files {
        println!("{}", f);
    }
}

fn print_summary(stats: &SyncStats) {
    let mut line = format!(
        "{} {} of {} files, {} bytes",
        "done:".green().bold(),
        stats.files_transferred,
        stats.files_offered,
        stats.bytes_transferred
    );
    if stats.hash_mismatches > 0 {
        line.push_str(&format!(
            ", {}",
            format!("{} kept with different hash", stats.hash_mismatches).yellow()
        ));
    }
    println!("{}", line);
}

async fn run(cli: Cli) -> Result<()> {
    let options = SyncOptions {
        root: cli.root(),
        show_progress: !cli.no_progress,
    };

    match &cli.command {
        Command::Send { addr } => {
            let stats = sync_send(addr, &options, |files| {
                print_listing("files being offered:", files)
            })
            .await
            .with_context(|| format!("send to {} failed", addr))?;
            print_summary(&stats);
        }
        Command::Recv { addr } => {
            let listener = Listener::bind(addr).await?;
            tracing::info!("listening on {}", listener.local_addr()?);
            let stats = sync_recv(listener, &options, |files| {
                print_listing("files we already have:", files)
            })
            .await
            .context("receive failed")?;
            print_summary(&stats);
        }
        Command::Manifest { json } => {
            let files = manifest::scan(options.root.clone())
                .await
                .with_context(|| format!("failed to scan {}", options.root.display()))?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&files)?);
            } else {
                for f in &files {
                    println!("{}", f);
                }
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_level()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}
