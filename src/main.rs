use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser};
use hero_slideshow::config::Configuration;
use hero_slideshow::console::{self, ConsoleCommand};
use hero_slideshow::events::{PageInput, PreloadEvent};
use hero_slideshow::page_model::{Document, ElementId, PageDescription, Surface};
use hero_slideshow::site::Site;
use hero_slideshow::tasks;
use hero_slideshow::tasks::preloader::{FsImageSource, ImagePreloader};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "hero-slideshow",
    version,
    about = "Headless landing page hero slideshow"
)]
struct Args {
    /// Path to YAML config
    #[arg(value_name = "CONFIG")]
    config: PathBuf,
    /// Page description (YAML or JSON); overrides `page` from the config
    #[arg(long, value_name = "FILE")]
    page: Option<PathBuf>,
    /// Stop after this long, e.g. `30s` or `2m`
    #[arg(long = "run-for", value_name = "DURATION", value_parser = humantime::parse_duration)]
    run_for: Option<Duration>,
    /// Increase log verbosity (repeatable)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbosity: u8) -> Result<()> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"))
        .add_directive(format!("hero_slideshow={level}").parse()?)
        .add_directive(format!("page_model={level}").parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let Args {
        config,
        page,
        run_for,
        verbose,
    } = Args::parse();
    init_tracing(verbose)?;

    let cfg = Configuration::from_yaml_file(&config)
        .with_context(|| format!("failed to load configuration from {}", config.display()))?
        .validated()
        .context("invalid configuration values")?;
    tracing::debug!("Loaded configuration from {}:\n{:#?}", config.display(), cfg);

    let page_path = page
        .or_else(|| cfg.page.clone())
        .ok_or_else(|| anyhow!("no page description; set `page` in the config or pass --page"))?;
    let document = PageDescription::from_path(&page_path)?.build();
    tracing::info!(page = %page_path.display(), elements = document.len(), "page built");

    // Element handles never change, so a snapshot is enough to resolve
    // console selectors while the runtime owns the live document.
    let lookup = document.clone();
    let origin = tokio::time::Instant::now();
    let site = Site::mount(document, &cfg, Duration::ZERO);

    let (input_tx, input_rx) = mpsc::channel::<PageInput<ElementId>>(64); // Console -> Runtime
    let (preload_tx, preload_rx) = mpsc::channel::<PreloadEvent<ElementId>>(64); // Preloader -> Runtime

    let cancel = CancellationToken::new();

    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if let Err(err) = tokio::signal::ctrl_c().await {
                tracing::warn!("ctrl-c handler failed: {err}");
                return;
            }
            tracing::info!("ctrl-c received; initiating shutdown");
            cancel.cancel();
        });
    }

    if let Some(limit) = run_for {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => {}
                _ = tokio::time::sleep(limit) => {
                    tracing::info!(limit = %humantime::format_duration(limit), "run time elapsed; initiating shutdown");
                    cancel.cancel();
                }
            }
        });
    }

    // The reader thread blocks on stdin, so it is detached rather than joined.
    {
        let cancel = cancel.clone();
        let stop_on_eof = run_for.is_none();
        std::thread::spawn(move || read_console(lookup, input_tx, cancel, stop_on_eof));
    }

    let preloader = ImagePreloader::discover(site.surface(), &cfg.preload);
    let source = Arc::new(FsImageSource::new(&cfg.site_root));
    let preload_task = tokio::spawn(preloader.run(source, preload_tx, cancel.clone()));

    let site = tasks::runtime::run(site, origin, input_rx, preload_rx, cancel.clone()).await;
    cancel.cancel();
    let report = preload_task.await.context("preload task failed")?;

    let carousel = site.carousel();
    let document = site.surface();
    println!("# hero slideshow");
    println!(
        "slide: {} / {}",
        (carousel.current_index() + 1).min(carousel.total()),
        carousel.total()
    );
    if let Some(label) = document.query(None, &cfg.slider.selectors.current) {
        println!("counter: {}", document.text(&label).unwrap_or_default());
    }
    if let Some(bar) = document.query(None, &cfg.slider.selectors.progress) {
        println!(
            "progress: {}",
            document.style(&bar, "width").unwrap_or_else(|| "-".into())
        );
    }
    println!(
        "images: {} loaded, {} failed",
        report.loaded.len(),
        report.failed.len()
    );
    for failure in report.failures() {
        println!("  failed: {}", failure.error);
    }

    Ok(())
}

fn read_console(
    lookup: Document,
    inputs: mpsc::Sender<PageInput<ElementId>>,
    cancel: CancellationToken,
    stop_on_eof: bool,
) {
    for line in io::stdin().lock().lines() {
        if cancel.is_cancelled() {
            return;
        }
        let line = match line {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!("stdin reader failed: {err}");
                break;
            }
        };
        match console::parse_line(&line, &lookup) {
            Ok(None) => {}
            Ok(Some(ConsoleCommand::Help)) => println!("{}", console::HELP),
            Ok(Some(ConsoleCommand::Quit)) => {
                tracing::info!("quit requested; initiating shutdown");
                cancel.cancel();
                return;
            }
            Ok(Some(ConsoleCommand::Inputs(batch))) => {
                for input in batch {
                    if inputs.blocking_send(input).is_err() {
                        return;
                    }
                }
            }
            Err(err) => eprintln!("{err:#}"),
        }
    }
    if stop_on_eof {
        tracing::info!("stdin closed; initiating shutdown");
        cancel.cancel();
    }
}
