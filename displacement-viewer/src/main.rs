use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use displacement_viewer::config::{Config, GridConfig, SequenceConfig};
use displacement_viewer::display;
use displacement_viewer::sequence::render_sequence;
use displacement_viewer::{DisplacementField, Orientation, Quiver, QuiverVisualiser};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Quiver plots of dx/dy displacement fields
#[derive(Parser)]
#[command(name = "displacement-viewer")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render dx/dy displacement CSV files as quiver plots", long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one dx/dy pair
    Plot(PlotArgs),
    /// Render a numbered series of frame pairs
    Sequence(SequenceArgs),
    /// Load and check the inputs without rendering
    Validate(PlotArgs),
}

#[derive(Args)]
struct PlotArgs {
    /// Horizontal displacement CSV
    #[arg(long)]
    dx: Option<PathBuf>,
    /// Vertical displacement CSV
    #[arg(long)]
    dy: Option<PathBuf>,
    /// Output PNG
    #[arg(short, long)]
    output: Option<PathBuf>,
    #[arg(long)]
    title: Option<String>,
    /// Pixel width covered by the coordinate grid
    #[arg(long)]
    grid_width: Option<u32>,
    /// Pixel height covered by the coordinate grid
    #[arg(long)]
    grid_height: Option<u32>,
    /// Grid samples per axis
    #[arg(long)]
    samples: Option<usize>,
    /// Origin top-left: invert the y axis and negate dy
    #[arg(long)]
    image_axes: bool,
    /// Fixed arrow scale instead of autoscaling
    #[arg(long)]
    scale: Option<f64>,
    /// Draw arrows only, without caption and axes
    #[arg(long)]
    no_axes: bool,
    /// Write the PNG without opening a window
    #[arg(long)]
    no_show: bool,
}

impl PlotArgs {
    fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(dx) = self.dx {
            config.input.dx = dx;
        }
        if let Some(dy) = self.dy {
            config.input.dy = dy;
        }
        if let Some(output) = self.output {
            config.plot.output = output;
        }
        if self.title.is_some() {
            config.plot.title = self.title;
        }
        if self.image_axes {
            config.plot.orientation = Orientation::Image;
        }
        if self.scale.is_some() {
            config.plot.scale = self.scale;
        }
        if self.no_axes {
            config.plot.axes = false;
            config.plot.title = None;
        }
        if self.no_show {
            config.plot.show = false;
        }

        if self.grid_width.is_some() || self.grid_height.is_some() || self.samples.is_some() {
            let base = config.grid.as_ref();
            let width = self.grid_width.or(base.map(|g| g.width));
            let height = self.grid_height.or(base.map(|g| g.height));
            let samples = self.samples.or(base.map(|g| g.samples));
            match (width, height, samples) {
                (Some(width), Some(height), Some(samples)) => {
                    config.grid = Some(GridConfig {
                        width,
                        height,
                        samples,
                    })
                }
                _ => bail!("--grid-width, --grid-height and --samples must be given together"),
            }
        }
        Ok(())
    }
}

#[derive(Args)]
struct SequenceArgs {
    /// Directory holding dx_{i}_{j}.csv / dy_{i}_{j}.csv
    #[arg(long)]
    dir: Option<PathBuf>,
    #[arg(long)]
    start: Option<u32>,
    #[arg(long)]
    end: Option<u32>,
    #[arg(long)]
    step: Option<u32>,
    /// Directory receiving quiver_{i:06}.png frames
    #[arg(long)]
    output_dir: Option<PathBuf>,
    #[command(flatten)]
    plot: PlotArgs,
}

impl SequenceArgs {
    fn apply(self, config: &mut Config) -> Result<SequenceConfig> {
        let base = config.sequence.clone();
        let start = self
            .start
            .or(base.as_ref().map(|s| s.start))
            .context("--start is required when the config has no [sequence] section")?;
        let end = self
            .end
            .or(base.as_ref().map(|s| s.end))
            .context("--end is required when the config has no [sequence] section")?;
        let sequence = SequenceConfig {
            dir: self
                .dir
                .or(base.as_ref().map(|s| s.dir.clone()))
                .unwrap_or_else(|| PathBuf::from("data/out")),
            start,
            end,
            step: self.step.or(base.as_ref().map(|s| s.step)).unwrap_or(1),
            output_dir: self
                .output_dir
                .or(base.as_ref().map(|s| s.output_dir.clone()))
                .unwrap_or_else(|| PathBuf::from("output")),
        };
        self.plot.apply(config)?;
        config.sequence = Some(sequence.clone());
        Ok(sequence)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Plot(args) => {
            args.apply(&mut config)?;
            config.validate()?;
            plot(&config)
        }
        Commands::Sequence(args) => {
            let sequence = args.apply(&mut config)?;
            config.validate()?;
            config.log_summary();
            render_sequence(&config, &sequence)?;
            Ok(())
        }
        Commands::Validate(args) => {
            args.apply(&mut config)?;
            config.validate()?;
            validate(&config)
        }
    }
}

fn load_quiver(config: &Config) -> Result<Quiver> {
    let field = DisplacementField::load(&config.input.dx, &config.input.dy)?;
    let (rows, cols) = field.shape();
    tracing::info!(
        "Loaded field {}x{} ({} of {} cells finite)",
        rows,
        cols,
        field.valid_cells(),
        field.len()
    );
    let grid = config.coordinate_grid();
    Ok(Quiver::build(&field, grid.as_ref(), config.plot.orientation)?)
}

fn plot(config: &Config) -> Result<()> {
    config.log_summary();
    let quiver = load_quiver(config)?;
    let visualiser = QuiverVisualiser::new(config.plot.render_options());
    visualiser.render(&quiver, &config.plot.output)?;

    if config.plot.show {
        let frame = visualiser.render_to_buffer(&quiver)?;
        let title = config
            .plot
            .title
            .clone()
            .unwrap_or_else(|| config.plot.output.display().to_string());
        display::show_blocking(&title, config.plot.image_width, config.plot.image_height, &frame)?;
    }
    Ok(())
}

fn validate(config: &Config) -> Result<()> {
    config.log_summary();
    let quiver = load_quiver(config)?;
    tracing::info!(
        "OK: {} arrows, max magnitude {:.4}, autoscale {:.4}",
        quiver.len(),
        quiver.max_magnitude(),
        quiver.auto_scale()
    );
    Ok(())
}
