use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use topicmap_app::{LoadState, MapController};
use topicmap_core::{EpisodeId, HighlightMode, MapConfig};
use topicmap_graph::{DEFAULT_MAX_BARS, NEW_TERRITORY_PREVIEW, Vec2};
use topicmap_provider::{ClusterProvider, JsonFileProvider, ProviderConfig, StaticProvider};

const LOAD_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_SCALE: f32 = 8.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect and render topic cluster maps", long_about = None)]
struct Cli {
    #[command(flatten)]
    source: SourceArgs,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Directory containing clusters.json and comparisons/; demo data when omitted
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,

    /// Map width in logical pixels
    #[arg(long, default_value_t = 800.0, global = true)]
    width: f32,

    /// Map height in logical pixels
    #[arg(long, default_value_t = 600.0, global = true)]
    height: f32,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the computed bubble geometry
    Layout {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Summarize an episode's clusters against the notebook
    Compare {
        #[arg(short, long)]
        episode: String,
    },
    /// Report which cluster sits under a point
    Hit { x: f32, y: f32 },
    /// Render the map to a PNG file
    Render {
        #[arg(short, long, default_value = "topicmap.png")]
        out: PathBuf,

        /// none, episode, notebook or comparison
        #[arg(short, long, default_value = "none")]
        mode: HighlightMode,

        #[arg(short, long)]
        episode: Option<String>,

        /// Device pixel ratio of the output image (up to 8)
        #[arg(long, default_value_t = 1.0, value_parser = parse_scale)]
        scale: f32,

        #[arg(long)]
        legend: bool,
    },
    /// List the largest clusters
    Rank {
        #[arg(long, default_value_t = DEFAULT_MAX_BARS)]
        max: usize,
    },
}

fn provider(source: &SourceArgs) -> Arc<dyn ClusterProvider> {
    match &source.data_dir {
        Some(dir) => Arc::new(JsonFileProvider::new(ProviderConfig::new(dir))),
        None => Arc::new(StaticProvider::demo()),
    }
}

fn parse_scale(raw: &str) -> Result<f32, String> {
    let scale: f32 = raw.parse().map_err(|_| format!("`{raw}` is not a number"))?;
    if !(scale > 0.0 && scale <= MAX_SCALE) {
        return Err(format!("scale must be in (0, {MAX_SCALE}]"));
    }
    Ok(scale)
}

/// Load synchronously. `None` means the source is reachable but holds no
/// clusters, which is reported but not treated as an error.
fn load(source: &SourceArgs, config: MapConfig) -> Result<Option<MapController>> {
    let mut controller = MapController::new(provider(source), config);
    controller.reload();
    if !controller.wait_for_load(LOAD_TIMEOUT) {
        bail!("Timed out loading clusters");
    }
    match controller.state() {
        LoadState::Failed(message) => bail!("Failed to load clusters: {message}"),
        LoadState::Empty => {
            tracing::info!("Data source returned an empty snapshot");
            println!("no clusters");
            Ok(None)
        }
        _ => {
            let count = controller.snapshot().map_or(0, |snapshot| snapshot.len());
            tracing::info!("Loaded {} clusters", count);
            Ok(Some(controller))
        }
    }
}

fn base_config(source: &SourceArgs) -> MapConfig {
    MapConfig {
        width: source.width,
        height: source.height,
        ..MapConfig::default()
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let source = &cli.source;

    match cli.command {
        Command::Layout { json } => {
            let Some(mut controller) = load(source, base_config(source))? else {
                return Ok(());
            };
            let Some(layout) = controller.layout() else {
                bail!("No layout available");
            };
            if json {
                println!("{}", serde_json::to_string_pretty(layout.as_ref())?);
                return Ok(());
            }
            let Some(snapshot) = controller.snapshot() else {
                bail!("No snapshot available");
            };
            println!("{:>6}  {:>8}  {:>8}  {:>7}  label", "id", "x", "y", "radius");
            for (cluster, bubble) in snapshot.clusters().iter().zip(&layout.bubbles) {
                println!(
                    "{:>6}  {:>8.1}  {:>8.1}  {:>7.1}  {}",
                    bubble.id,
                    bubble.circle.center.x,
                    bubble.circle.center.y,
                    bubble.circle.radius,
                    cluster.label
                );
            }
        }
        Command::Compare { episode } => {
            let config = MapConfig {
                highlight_mode: HighlightMode::Comparison,
                episode_id: Some(EpisodeId::new(episode)),
                ..base_config(source)
            };
            let Some(controller) = load(source, config)? else {
                return Ok(());
            };
            let (Some(summary), Some(snapshot)) = (controller.summary(), controller.snapshot())
            else {
                bail!("No comparison available");
            };
            println!("Episode {}", summary.episode_id);
            if summary.is_empty() {
                println!("  touches no clusters");
                return Ok(());
            }
            println!("  clusters covered:    {}", summary.episode_cluster_count);
            println!("  already in notebook: {}", summary.overlap_count);
            println!("  new territory:       {}", summary.new_territory_count);
            for label in summary.preview_labels(Some(snapshot), NEW_TERRITORY_PREVIEW) {
                println!("    - {label}");
            }
            let remaining = summary.new_territory_preview(NEW_TERRITORY_PREVIEW).remaining;
            if remaining > 0 {
                println!("    +{remaining} more");
            }
        }
        Command::Hit { x, y } => {
            let Some(mut controller) = load(source, base_config(source))? else {
                return Ok(());
            };
            controller.pointer_moved(Vec2::new(x, y));
            match controller.hovered_cluster() {
                Some(cluster) => println!("{} {}", cluster.id, cluster.label),
                None => println!("no cluster at ({x}, {y})"),
            }
        }
        Command::Render {
            out,
            mode,
            episode,
            scale,
            legend,
        } => {
            let config = MapConfig {
                highlight_mode: mode,
                episode_id: episode.map(EpisodeId::new),
                show_legend: legend,
                ..base_config(source)
            };
            let Some(mut controller) = load(source, config)? else {
                return Ok(());
            };
            let written = controller.export_png(&out, scale)?;
            tracing::info!("Exported map at scale {} to {:?}", scale, written);
            println!("Wrote {}", written.display());
        }
        Command::Rank { max } => {
            let Some(controller) = load(source, base_config(source))? else {
                return Ok(());
            };
            for (rank, bar) in controller.ranked_bars(max).iter().enumerate() {
                let width = (bar.fraction * 30.0).round() as usize;
                println!(
                    "{:>2}. {:<30} {:>6}  {}",
                    rank + 1,
                    bar.label,
                    bar.count,
                    "#".repeat(width)
                );
            }
        }
    }

    Ok(())
}
