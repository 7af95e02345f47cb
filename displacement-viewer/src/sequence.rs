use crate::config::{Config, SequenceConfig};
use crate::field::DisplacementField;
use crate::quiver::Quiver;
use crate::visualisation::QuiverVisualiser;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Two consecutive frames whose displacement was stored as `dx_{first}_{second}.csv`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FramePair {
    pub first: u32,
    pub second: u32,
}

impl FramePair {
    pub fn dx_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("dx_{}_{}.csv", self.first, self.second))
    }

    pub fn dy_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("dy_{}_{}.csv", self.first, self.second))
    }

    pub fn output_path(&self, dir: &Path) -> PathBuf {
        dir.join(format!("quiver_{:06}.png", self.first))
    }
}

/// Frame pairs `(i, i + step)` for `i` in `start..=end`. Pairs whose second
/// frame would overflow `u32` are dropped; `SequenceConfig::validate` rejects them.
pub fn frame_pairs(sequence: &SequenceConfig) -> Vec<FramePair> {
    (sequence.start..=sequence.end)
        .step_by(sequence.step.max(1) as usize)
        .filter_map(|first| {
            first
                .checked_add(sequence.step)
                .map(|second| FramePair { first, second })
        })
        .collect()
}

/// Render every frame pair of `sequence` with the grid and plot settings of `config`.
/// Stops at the first frame that fails to load or render.
pub fn render_sequence(config: &Config, sequence: &SequenceConfig) -> Result<Vec<PathBuf>> {
    sequence.validate()?;
    let grid = config.coordinate_grid();
    let visualiser = QuiverVisualiser::new(config.plot.render_options());
    let pairs = frame_pairs(sequence);
    tracing::info!("Rendering {} frame pairs", pairs.len());

    let mut written = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let start = Instant::now();
        let field = DisplacementField::load(pair.dx_path(&sequence.dir), pair.dy_path(&sequence.dir))
            .with_context(|| format!("Frame pair {} & {}", pair.first, pair.second))?;
        let quiver = Quiver::build(&field, grid.as_ref(), config.plot.orientation)
            .with_context(|| format!("Frame pair {} & {}", pair.first, pair.second))?;

        let output = pair.output_path(&sequence.output_dir);
        visualiser.render(&quiver, &output)?;
        tracing::info!(
            "no.{} & no.{} fin. time: {:.3}[s]",
            pair.first,
            pair.second,
            start.elapsed().as_secs_f64()
        );
        written.push(output);
    }

    tracing::info!("Frames saved to {}", sequence.output_dir.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence(start: u32, end: u32, step: u32) -> SequenceConfig {
        SequenceConfig {
            dir: PathBuf::from("data/out"),
            start,
            end,
            step,
            output_dir: PathBuf::from("output"),
        }
    }

    #[test]
    fn pairs_follow_the_step() {
        let pairs = frame_pairs(&sequence(0, 4, 2));
        assert_eq!(
            pairs,
            vec![
                FramePair { first: 0, second: 2 },
                FramePair { first: 2, second: 4 },
                FramePair { first: 4, second: 6 },
            ]
        );
    }

    #[test]
    fn end_is_inclusive() {
        assert_eq!(frame_pairs(&sequence(3, 3, 1)).len(), 1);
        assert_eq!(frame_pairs(&sequence(0, 5, 2)).len(), 3);
    }

    #[test]
    fn pairs_near_u32_max_do_not_overflow() {
        let pairs = frame_pairs(&sequence(u32::MAX - 2, u32::MAX, 2));
        assert_eq!(
            pairs,
            vec![FramePair { first: u32::MAX - 2, second: u32::MAX }]
        );
        assert!(sequence(u32::MAX - 2, u32::MAX, 2).validate().is_err());
    }

    #[test]
    fn file_names_match_the_correlation_output() {
        let pair = FramePair { first: 1, second: 2 };
        let dir = Path::new("data/out");
        assert_eq!(pair.dx_path(dir), PathBuf::from("data/out/dx_1_2.csv"));
        assert_eq!(pair.dy_path(dir), PathBuf::from("data/out/dy_1_2.csv"));
        assert_eq!(
            pair.output_path(Path::new("output")),
            PathBuf::from("output/quiver_000001.png")
        );
    }
}
