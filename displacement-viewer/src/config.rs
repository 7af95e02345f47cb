use crate::grid::CoordinateGrid;
use crate::quiver::Orientation;
use crate::visualisation::RenderOptions;
use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Input CSV paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_dx_path")]
    pub dx: PathBuf,
    #[serde(default = "default_dy_path")]
    pub dy: PathBuf,
}

fn default_dx_path() -> PathBuf {
    PathBuf::from("data/out/dx_0_1.csv")
}

fn default_dy_path() -> PathBuf {
    PathBuf::from("data/out/dy_0_1.csv")
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dx: default_dx_path(),
            dy: default_dy_path(),
        }
    }
}

/// Pixel coordinate grid: `samples` points per axis across the image extent
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    pub width: u32,   // Image width (pixels)
    pub height: u32,  // Image height (pixels)
    pub samples: usize,
}

impl GridConfig {
    fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(anyhow!(
                "Grid extent must be positive (width={}, height={})",
                self.width,
                self.height
            ));
        }
        if self.samples == 0 {
            return Err(anyhow!("Grid samples must be positive"));
        }
        Ok(())
    }

    pub fn build(&self) -> CoordinateGrid {
        CoordinateGrid::pixel_linspace(self.width, self.height, self.samples)
    }
}

/// Plot appearance and output location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlotConfig {
    #[serde(default)]
    pub orientation: Orientation,
    #[serde(default = "default_image_width")]
    pub image_width: u32,
    #[serde(default = "default_image_height")]
    pub image_height: u32,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default = "default_axes")]
    pub axes: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<f64>, // Optional: autoscaled from the longest arrow if not provided
    #[serde(default = "default_show")]
    pub show: bool, // Open a window after writing the PNG
}

fn default_image_width() -> u32 {
    1200
}

fn default_image_height() -> u32 {
    1000
}

fn default_output() -> PathBuf {
    PathBuf::from("quiver.png")
}

fn default_axes() -> bool {
    true
}

fn default_show() -> bool {
    true
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            orientation: Orientation::default(),
            image_width: default_image_width(),
            image_height: default_image_height(),
            output: default_output(),
            title: None,
            axes: default_axes(),
            scale: None,
            show: default_show(),
        }
    }
}

impl PlotConfig {
    fn validate(&self) -> Result<()> {
        if self.image_width == 0 || self.image_height == 0 {
            return Err(anyhow!(
                "Image dimensions must be positive (width={}, height={})",
                self.image_width,
                self.image_height
            ));
        }
        if let Some(scale) = self.scale {
            if !(scale.is_finite() && scale > 0.0) {
                return Err(anyhow!("scale must be positive, got {}", scale));
            }
        }
        Ok(())
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            width: self.image_width,
            height: self.image_height,
            title: self.title.clone(),
            axes: self.axes,
            scale: self.scale,
        }
    }
}

/// Batch of frame pairs `dx_{i}_{i+step}.csv`, `i` in `start..=end`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceConfig {
    #[serde(default = "default_sequence_dir")]
    pub dir: PathBuf,
    pub start: u32,
    pub end: u32,
    #[serde(default = "default_step")]
    pub step: u32,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_sequence_dir() -> PathBuf {
    PathBuf::from("data/out")
}

fn default_step() -> u32 {
    1
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl SequenceConfig {
    pub fn validate(&self) -> Result<()> {
        if self.step == 0 {
            return Err(anyhow!("sequence step must be positive"));
        }
        if self.end < self.start {
            return Err(anyhow!(
                "sequence end must not precede start (start={}, end={})",
                self.start,
                self.end
            ));
        }
        if self.end.checked_add(self.step).is_none() {
            return Err(anyhow!(
                "sequence end + step overflows frame numbering (end={}, step={})",
                self.end,
                self.step
            ));
        }
        Ok(())
    }
}

/// Complete viewer configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<GridConfig>,
    #[serde(default)]
    pub plot: PlotConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceConfig>,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read config file '{}': {}", path, e))?;

        let config = Self::from_toml(&content)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| anyhow!("Failed to parse TOML config: {}", e))
    }

    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<()> {
        if let Some(grid) = &self.grid {
            grid.validate()?;
        }
        self.plot.validate()?;
        if let Some(sequence) = &self.sequence {
            sequence.validate()?;
        }
        Ok(())
    }

    pub fn coordinate_grid(&self) -> Option<CoordinateGrid> {
        self.grid.as_ref().map(GridConfig::build)
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        tracing::info!("=== Viewer Configuration ===");
        tracing::info!(
            "Input: dx={}, dy={}",
            self.input.dx.display(),
            self.input.dy.display()
        );
        match &self.grid {
            Some(grid) => tracing::info!(
                "Grid: {} x {} px, {} samples per axis",
                grid.width,
                grid.height,
                grid.samples
            ),
            None => tracing::info!("Grid: cell indices"),
        }
        tracing::info!(
            "Plot: {}x{} px, orientation={:?}, scale={}, window={}",
            self.plot.image_width,
            self.plot.image_height,
            self.plot.orientation,
            self.plot
                .scale
                .map_or_else(|| "auto".to_string(), |s| s.to_string()),
            self.plot.show
        );
        if let Some(seq) = &self.sequence {
            tracing::info!(
                "Sequence: {} frames {}..={} step {} -> {}",
                seq.dir.display(),
                seq.start,
                seq.end,
                seq.step,
                seq.output_dir.display()
            );
        }
        tracing::info!("============================");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.input.dx, PathBuf::from("data/out/dx_0_1.csv"));
        assert_eq!(config.input.dy, PathBuf::from("data/out/dy_0_1.csv"));
        assert!(config.grid.is_none());
        assert_eq!(config.plot.orientation, Orientation::Cartesian);
        assert_eq!(config.plot.output, PathBuf::from("quiver.png"));
        assert!(config.plot.show);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parses_image_variant() {
        let config = Config::from_toml(
            r#"
            [input]
            dx = "data/out/dx_1_2.csv"
            dy = "data/out/dy_1_2.csv"

            [grid]
            width = 570
            height = 512
            samples = 48

            [plot]
            orientation = "image"
            image_width = 1200
            image_height = 1000
            title = "frame 1"
            "#,
        )
        .unwrap();
        config.validate().unwrap();
        assert_eq!(config.plot.orientation, Orientation::Image);
        assert_eq!(config.coordinate_grid().unwrap().shape(), (48, 48));
        assert_eq!(config.plot.render_options().title.as_deref(), Some("frame 1"));
    }

    #[test]
    fn rejects_zero_samples() {
        let config = Config::from_toml("[grid]\nwidth = 10\nheight = 10\nsamples = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_image_size() {
        let config = Config::from_toml("[plot]\nimage_width = 0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_non_positive_scale() {
        let config = Config::from_toml("[plot]\nscale = -1.0\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_sequence_step() {
        let config = Config::from_toml("[sequence]\nstart = 0\nend = 4\nstep = 0\n").unwrap();
        assert!(config.validate().is_err());
        let config = Config::from_toml("[sequence]\nstart = 5\nend = 4\n").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_frame_numbers_past_u32() {
        let near_max = format!("[sequence]\nstart = 0\nend = {}\nstep = 2\n", u32::MAX - 1);
        let config = Config::from_toml(&near_max).unwrap();
        assert!(config.validate().is_err());

        let at_limit = format!("[sequence]\nstart = 0\nend = {}\nstep = 1\n", u32::MAX - 1);
        assert!(Config::from_toml(&at_limit).unwrap().validate().is_ok());
    }

    #[test]
    fn window_can_be_disabled() {
        let config = Config::from_toml("[plot]\nshow = false\n").unwrap();
        assert!(!config.plot.show);
    }

    #[test]
    fn unknown_orientation_fails_to_parse() {
        assert!(Config::from_toml("[plot]\norientation = \"polar\"\n").is_err());
    }
}
