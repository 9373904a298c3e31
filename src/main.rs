use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use synaptiq::{
    config::Config,
    constants::DOWNLOAD_PREFIX,
    llm::bootstrap::{download_model, DownloadOutcome},
    organizer::flatten_directory,
    ModelRegistry, OrganizeEvent, Orchestrator, StopSignal, Strategy,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "synaptiq")]
#[command(about = "Organize a folder by extension, by date, or by what the files are about")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to config/settings.toml or ~/.config/synaptiq/settings.toml)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Move the files of a directory into subfolders
    Organize {
        /// Directory to organize
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        /// Grouping strategy
        #[arg(long, value_enum, default_value = "ai")]
        by: Strategy,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Ward distance threshold for AI clustering (lower = more folders)
        #[arg(long)]
        threshold: Option<f64>,
        /// Fail instead of downloading a missing chat model
        #[arg(long)]
        no_download: bool,
    },
    /// Download the chat model used for naming folders
    FetchModel,
    /// Move every file in subfolders back into DIR and remove empty folders
    Flatten {
        /// Directory to flatten
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "synaptiq=debug" } else { "synaptiq=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::from_file(path),
        None => Config::load(),
    }
}

fn confirm(prompt: String) -> Result<bool> {
    Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .context("Failed to read user input")
}

fn stamp(line: &str) -> String {
    format!("[{}] {}", Local::now().format("%H:%M:%S"), line)
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Organize {
            dir,
            by,
            yes,
            threshold,
            no_download,
        } => {
            if let Some(threshold) = threshold {
                config.organizer.distance_threshold = threshold;
            }
            if no_download {
                config.naming.auto_download = false;
            }
            if yes {
                config.organizer.skip_confirmation = true;
            }
            config.validate()?;
            organize(config, &dir, by).await
        }
        Commands::FetchModel => fetch_model(&config).await,
        Commands::Flatten { dir, yes } => {
            if !yes && !confirm(format!("Move every file under {} back to the top level?", dir.display()))? {
                println!("Cancelled.");
                return Ok(ExitCode::SUCCESS);
            }
            let report = flatten_directory(&dir)?;
            println!(
                "✔ Moved {} file(s) ({} renamed), removed {} folder(s).",
                report.moved, report.renamed, report.directories_removed
            );
            if report.failed > 0 {
                eprintln!("⚠️  {} file(s) could not be moved", report.failed);
                return Ok(ExitCode::FAILURE);
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn organize(config: Config, dir: &Path, strategy: Strategy) -> Result<ExitCode> {
    if !config.organizer.skip_confirmation
        && !confirm(format!("Organize {} by {}? Files will be moved.", dir.display(), strategy))?
    {
        println!("Cancelled.");
        return Ok(ExitCode::SUCCESS);
    }

    let models = ModelRegistry::from_config(&config);
    let orchestrator = Orchestrator::new(config, models);
    let mut handle = orchestrator.start(dir, strategy)?;
    let stop = handle.stop_signal();

    let pb = ProgressBar::new(1000);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {percent}% {msg}")?
            .progress_chars("#>-"),
    );

    let mut code = ExitCode::SUCCESS;
    let mut stopping = false;
    loop {
        tokio::select! {
            event = handle.next_event() => {
                let Some(event) = event else { break };
                match event {
                    // Download lines overwrite each other
                    OrganizeEvent::Log(line) if line.starts_with(DOWNLOAD_PREFIX) => pb.set_message(line),
                    OrganizeEvent::Log(line) => pb.println(stamp(&line)),
                    OrganizeEvent::Progress(fraction) => pb.set_position((fraction * 1000.0) as u64),
                    OrganizeEvent::Stats(stats) => pb.set_message(format!(
                        "{}/{} files, {} folders",
                        stats.processed, stats.total, stats.groups
                    )),
                    OrganizeEvent::Finished => pb.finish(),
                    OrganizeEvent::Stopped => {
                        pb.abandon_with_message("stopped");
                        code = ExitCode::from(130);
                    }
                    OrganizeEvent::Failed(message) => {
                        pb.abandon();
                        eprintln!("{}", stamp(&format!("❌ {}", message)));
                        code = ExitCode::FAILURE;
                    }
                }
            }
            _ = tokio::signal::ctrl_c(), if !stopping => {
                stopping = true;
                pb.println(stamp("Stopping after the current file..."));
                stop.stop();
            }
        }
    }

    handle.wait().await?;
    Ok(code)
}

async fn fetch_model(config: &Config) -> Result<ExitCode> {
    let dest = config.naming.resolved_model_path();
    if dest.is_file() {
        println!("✅ Chat model already present: {}", dest.display());
        return Ok(ExitCode::SUCCESS);
    }

    let stop = StopSignal::new();
    let watcher = stop.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            watcher.stop();
        }
    });

    let pb = ProgressBar::new_spinner();
    let outcome = download_model(&config.naming.model_url, &dest, &stop, |line| {
        if line.starts_with(DOWNLOAD_PREFIX) {
            pb.set_message(line);
        } else {
            pb.println(line);
        }
    })
    .await?;
    pb.finish_and_clear();

    match outcome {
        DownloadOutcome::Completed { bytes } => {
            println!("Saved {} ({:.1}MB)", dest.display(), bytes as f64 / (1024.0 * 1024.0));
            Ok(ExitCode::SUCCESS)
        }
        DownloadOutcome::Stopped => {
            println!("Download cancelled.");
            Ok(ExitCode::from(130))
        }
    }
}
