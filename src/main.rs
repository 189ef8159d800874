mod cli;

use heicdrop::{
    config,
    convert::HeifConverter,
    display,
    intake::IntakeGateway,
    notifications::ConsoleNotifier,
    queue::{ConversionQueue, QueueEvent},
    save::DirectorySaver,
    source::FileHandle,
    watch::DropFolderWatcher,
};
use heicdrop_common::TriggerSource;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Build the queue and gateway that every trigger source feeds.
fn build_gateway(config: &config::Config, output_dir: PathBuf) -> Arc<IntakeGateway> {
    let notifier = Arc::new(ConsoleNotifier);
    let queue = ConversionQueue::new(
        Arc::new(HeifConverter::new(config.tools.heif_dec.clone())),
        Arc::new(DirectorySaver::new(output_dir)),
        notifier.clone(),
    );
    Arc::new(IntakeGateway::new(queue, notifier))
}

async fn convert_files(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    json: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let mut candidates = Vec::with_capacity(files.len());
    for file in &files {
        if !file.exists() {
            anyhow::bail!("Input file does not exist: {:?}", file);
        }
        let handle = FileHandle::from_path(file)
            .await
            .with_context(|| format!("Failed to open {:?}", file))?;
        candidates.push(handle);
    }

    let output_dir = output.unwrap_or_else(|| config.output.dir.clone());
    tracing::info!("Saving converted files to {:?}", output_dir);

    let gateway = build_gateway(&config, output_dir);
    let outcome = gateway.accept(candidates, TriggerSource::Picker);
    if outcome.accepted == 0 {
        return Ok(());
    }

    let queue = gateway.queue();
    queue.wait_idle().await;

    let snapshot = queue.list();
    if json {
        println!("{}", serde_json::to_string_pretty(&*snapshot)?);
    } else {
        print!("{}", display::render_table(&snapshot));
        let summary = queue.summary();
        println!("\n{} converted, {} failed", summary.complete, summary.failed);
    }

    Ok(())
}

async fn watch_folder(
    dir: PathBuf,
    output: Option<PathBuf>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    let output_dir = output.unwrap_or_else(|| config.output.dir.clone());
    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Failed to create output directory: {:?}", output_dir))?;

    let drop_dir = dir
        .canonicalize()
        .with_context(|| format!("Drop folder does not exist: {:?}", dir))?;
    if output_dir.canonicalize()? == drop_dir {
        anyhow::bail!(
            "Output directory must differ from the drop folder: {:?} (use --output)",
            drop_dir
        );
    }

    let gateway = build_gateway(&config, output_dir.clone());
    let queue = gateway.queue().clone();

    let mut watcher = DropFolderWatcher::new(drop_dir, config.watch.clone(), gateway);
    watcher.start()?;

    println!(
        "Watching {} (saving to {})",
        watcher.dir().display(),
        output_dir.display()
    );
    println!("Commands: list, clear, quit");

    let mut events = queue.subscribe();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(QueueEvent::EntryCompleted { entry }) => {
                        println!(
                            "✓ {} -> {}",
                            entry.file_name(),
                            entry.output_name().unwrap_or_default()
                        );
                    }
                    Ok(QueueEvent::EntryFailed { file_name, error, .. }) => {
                        println!("✗ {}: {}", file_name, error);
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!("Missed {} queue events", n);
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }

            line = lines.next_line(), if stdin_open => {
                match line? {
                    Some(line) => match line.trim() {
                        "list" => {
                            let snapshot = queue.list();
                            if snapshot.is_empty() {
                                println!("Queue is empty");
                            } else {
                                print!("{}", display::render_table(&snapshot));
                            }
                        }
                        "clear" => {
                            if display::show_clear_completed(&queue.list()) {
                                println!("Cleared {} entries", queue.clear_completed());
                            } else {
                                println!("Nothing to clear");
                            }
                        }
                        "quit" | "exit" => break,
                        "" => {}
                        other => println!("Unknown command: {}", other),
                    },
                    // stdin closed: keep watching until ctrl-c
                    None => stdin_open = false,
                }
            }

            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::info!("Shutting down...");
    watcher.stop();
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "heicdrop=trace,heicdrop_codec=debug".to_string()
        } else {
            "heicdrop=info,heicdrop_codec=info".to_string()
        }
    });

    // Logs go to stderr so `convert --json` output stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Convert {
            files,
            output,
            json,
        } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(convert_files(files, output, json, cli.config.as_deref()))
        }
        Commands::Watch { dir, output } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(watch_folder(dir, output, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("heicdrop {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    println!("Checking HEIC decoders...\n");

    for tool in heicdrop_codec::check_tools() {
        let status = if tool.available { "✓" } else { "✗" };
        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version.lines().next().unwrap_or(""));
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    let configured = config::load_config_or_default(config_path)?.tools.heif_dec;
    println!();
    match heicdrop_codec::find_decoder(configured.as_deref()) {
        Ok(path) => println!("Using decoder: {}", path.display()),
        Err(e) => println!("No usable decoder ({}). Install libheif to convert files.", e),
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            print_config(&config);
        }
        None => {
            println!("No config file specified, using defaults");
            println!("Default config:");
            print_config(&config::Config::default());
        }
    }

    Ok(())
}

fn print_config(config: &config::Config) {
    println!("  Output dir: {}", config.output.dir.display());
    println!(
        "  Watch: settle {}s, poll every {}ms",
        config.watch.settle_time_secs, config.watch.poll_interval_ms
    );
    match config.tools.heif_dec {
        Some(ref tool) => println!("  Decoder: {}", tool.display()),
        None => println!("  Decoder: auto-detect"),
    }
}
