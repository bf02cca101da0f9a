mod app;
mod config;
mod graph;
mod interactome;
mod layout;
mod util;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Result, anyhow, bail};
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::{DEFAULT_RESIZE_DEBOUNCE, ViewerConfig};
use crate::graph::{
    ControllerConfig, DEFAULT_CLICK_THROTTLE, DEFAULT_MIN_VISUAL_WEIGHT, RenderModeSelector,
    SelectionPolicy,
};
use crate::interactome::FileInteractionSource;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum ClickPolicy {
    Recenter,
    Refetch,
}

impl From<ClickPolicy> for SelectionPolicy {
    fn from(policy: ClickPolicy) -> Self {
        match policy {
            ClickPolicy::Recenter => Self::Recenter,
            ClickPolicy::Refetch => Self::Refetch,
        }
    }
}

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Interaction table (.tsv with protein1/protein2/score columns, or .json)
    #[arg(long, default_value = "interactions.tsv")]
    data: PathBuf,

    /// Protein to center on at startup
    #[arg(long)]
    center: Option<String>,

    /// Id offered as a one-click search; repeat for several
    #[arg(long = "example-id", value_name = "ID")]
    example_ids: Vec<String>,

    /// Result sets larger than this are shown as a table
    #[arg(long, default_value_t = crate::graph::DEFAULT_TABLE_THRESHOLD)]
    table_threshold: usize,

    #[arg(long, default_value_t = DEFAULT_CLICK_THROTTLE.as_millis() as u64)]
    click_throttle_ms: u64,

    #[arg(long, default_value_t = DEFAULT_RESIZE_DEBOUNCE.as_millis() as u64)]
    resize_debounce_ms: u64,

    /// Floor applied to edge weights so weak interactions stay visible
    #[arg(long, default_value_t = DEFAULT_MIN_VISUAL_WEIGHT)]
    min_edge_weight: f64,

    #[arg(long, value_enum, default_value_t = ClickPolicy::Recenter)]
    click_policy: ClickPolicy,

    /// Reject searches for ids that do not start with this prefix
    #[arg(long)]
    id_prefix: Option<String>,

    #[arg(long, default_value_t = crate::layout::DEFAULT_LAYOUT_ITERATIONS)]
    layout_iterations: usize,

    /// tracing filter directive, overrides RUST_LOG
    #[arg(long)]
    log_filter: Option<String>,
}

impl Args {
    fn into_config(self) -> Result<ViewerConfig> {
        if !(0.0..=1.0).contains(&self.min_edge_weight) {
            bail!("--min-edge-weight must be within [0, 1]");
        }

        Ok(ViewerConfig {
            data_path: self.data,
            initial_center: self.center.filter(|center| !center.trim().is_empty()),
            example_ids: self
                .example_ids
                .into_iter()
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty())
                .collect(),
            controller: ControllerConfig {
                selector: RenderModeSelector::new(self.table_threshold),
                min_visual_weight: self.min_edge_weight,
                click_throttle: Duration::from_millis(self.click_throttle_ms),
                policy: self.click_policy.into(),
                id_prefix: self.id_prefix,
            },
            resize_debounce: Duration::from_millis(self.resize_debounce_ms),
            layout_iterations: self.layout_iterations,
        })
    }
}

fn init_tracing(directive: Option<&str>) {
    fmt()
        .with_env_filter(log_filter(directive))
        .with_target(true)
        .compact()
        .init();
}

fn log_filter(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(directive) => EnvFilter::try_new(directive).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"))
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_filter.as_deref());

    let config = args.into_config()?;
    info!(data = %config.data_path.display(), "starting interactome viewer");

    let source = Arc::new(FileInteractionSource::new(config.data_path.clone()));
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "interactome-viewer",
        options,
        Box::new(move |cc| Ok(Box::new(app::InteractomeApp::new(cc, config, source)))),
    )
    .map_err(|error| anyhow!("viewer exited with an error: {error}"))
}
