//! frame — render lazy-loading module widgets into static pages, and probe
//! their payloads headlessly.
//!
//! Run with:  `RUST_LOG=debug frame probe asteroids --config site/frame.toml`

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use frame_config::{ConfigWatcher, PageConfig};
use frame_core::{FrameWidget, Message};
use frame_loader::{Loader, ProbeBootstrap, SourceRetriever};
use frame_renderer::{render_page, PageLayout};
use frame_widgets::{WasmLoaderWidget, Widget};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "frame", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Render the page described by a config file to HTML.
    Render {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Output file; stdout when omitted.
        #[arg(long)]
        out:    Option<PathBuf>,
        /// Page path used to pick the active navigation link.
        #[arg(long, default_value = "/")]
        path:   String,
    },
    /// Retrieve, decompress and validate one widget's payload.
    Probe {
        widget: String,
        #[arg(long)]
        config: Option<PathBuf>,
        /// Layout width reported to the module when none is declared.
        #[arg(long, default_value_t = 800)]
        width:  u32,
    },
    /// Re-render whenever the config file changes.
    Watch {
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        out:    PathBuf,
        #[arg(long, default_value = "/")]
        path:   String,
    },
}

fn main() -> Result<()> {
    // Structured logging — RUST_LOG controls verbosity (default: info).
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("frame v{} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("cannot start runtime")?;

    match cli.command {
        Command::Render { config, out, path } => {
            let config_path = config.unwrap_or_else(frame_config::default_path);
            let page = frame_config::load(&config_path)?;
            write_page(&page, out.as_deref(), &path)
        }
        Command::Probe { widget, config, width } => {
            let config_path = config.unwrap_or_else(frame_config::default_path);
            rt.block_on(probe(&config_path, &widget, width))
        }
        Command::Watch { config, out, path } => {
            let config_path = config.unwrap_or_else(frame_config::default_path);
            rt.block_on(watch(&config_path, &out, &path))
        }
    }
}

fn write_page(page: &PageConfig, out: Option<&Path>, current_path: &str) -> Result<()> {
    let widgets: Vec<Widget> = page.widgets.iter().cloned().map(Widget::from_config).collect();
    let html = render_page(page, &widgets, current_path);
    let layout = PageLayout::from_config(page);

    match out {
        Some(out) => {
            std::fs::write(out, html).with_context(|| format!("cannot write {}", out.display()))?;
            info!(
                "rendered '{}' ({} widgets, {} forms) to {}",
                layout.title,
                layout.widgets.len(),
                layout.forms.len(),
                out.display()
            );
        }
        None => print!("{html}"),
    }
    Ok(())
}

async fn probe(config_path: &Path, id: &str, width: u32) -> Result<()> {
    let page = frame_config::load(config_path)?;
    let Some(config) = page.widget(id).cloned() else {
        bail!("no widget '{id}' in {}", config_path.display());
    };

    // Absolute sources resolve next to the config file.
    let root = config_path.parent().map(Path::to_path_buf);
    let bootstrap = ProbeBootstrap::new();
    let outcome = bootstrap.outcome();
    let mut loader = Loader::new(
        SourceRetriever::new(&page.loader, root)?,
        config.codec,
        bootstrap,
    );

    let mut widget = WasmLoaderWidget::new(config);
    if let Some(Message::Attached(id)) = widget.on_attach() {
        info!("{id}: attached");
    }
    let result = widget.activate(&mut loader, width).await;

    let outcome = outcome.borrow();
    if let Some(summary) = &outcome.summary {
        println!(
            "{id}: {} bytes, wasm v{}, {} sections",
            summary.size,
            summary.version,
            summary.sections.len()
        );
    }
    if let Some((selector, w, h)) = &outcome.run_at {
        println!("{id}: run on {selector} at {w}x{h}");
    }
    println!("{id}: {}", widget.state().name());
    result.map_err(Into::into)
}

async fn watch(config_path: &Path, out: &Path, current_path: &str) -> Result<()> {
    let page = frame_config::load(config_path)?;
    write_page(&page, Some(out), current_path)?;

    let (watcher, mut changes) = ConfigWatcher::spawn(config_path);
    info!("watching {}", watcher.path().display());

    while let Some(msg) = changes.recv().await {
        match msg {
            // Keep serving the last good page when the new config is broken.
            Message::ConfigReloaded => match frame_config::load(config_path) {
                Ok(page) => write_page(&page, Some(out), current_path)?,
                Err(e) => error!("config reload failed: {e}"),
            },
            other => debug!("ignoring {other:?}"),
        }
    }
    Ok(())
}
