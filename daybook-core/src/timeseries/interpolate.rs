use serde::{Deserialize, Serialize};

use crate::DaybookError;

/// Fills the gaps of a sampled sequence.
///
/// Sample positions are the slice indices. Implementations return one value
/// per input slot; known samples are expected to pass through unchanged.
pub trait Interpolator {
    /// Dense values for `samples`, where `None` marks a gap.
    ///
    /// # Errors
    /// Implementations return `DaybookError::Data` when a gap cannot be filled.
    fn fill(&self, samples: &[Option<f64>]) -> Result<Vec<f64>, DaybookError>;
}

/// Built-in interpolation kernels. None of them extrapolates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Interpolation {
    /// Straight line between the surrounding known samples.
    #[default]
    Linear,
    /// Closest known sample; ties go to the earlier one.
    Nearest,
    /// Last known sample before the gap.
    Previous,
    /// First known sample after the gap.
    Next,
}

impl Interpolator for Interpolation {
    fn fill(&self, samples: &[Option<f64>]) -> Result<Vec<f64>, DaybookError> {
        let known: Vec<(usize, f64)> = samples
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, v)))
            .collect();
        if known.is_empty() {
            return Err(DaybookError::Data(
                "no known sample to interpolate from".into(),
            ));
        }

        samples
            .iter()
            .enumerate()
            .map(|(i, sample)| {
                if let Some(v) = sample {
                    return Ok(*v);
                }
                let k = known.partition_point(|(j, _)| *j < i);
                let before = k.checked_sub(1).map(|p| known[p]);
                let after = known.get(k).copied();
                let filled = match (self, before, after) {
                    (Self::Linear, Some((i0, v0)), Some((i1, v1))) => {
                        let t = (i - i0) as f64 / (i1 - i0) as f64;
                        Some(v0 + (v1 - v0) * t)
                    }
                    (Self::Nearest, Some((i0, v0)), Some((i1, v1))) => {
                        Some(if i - i0 <= i1 - i { v0 } else { v1 })
                    }
                    (Self::Previous, Some((_, v0)), _) => Some(v0),
                    (Self::Next, _, Some((_, v1))) => Some(v1),
                    _ => None,
                };
                filled.ok_or_else(|| {
                    DaybookError::Data(format!(
                        "cannot extrapolate sample {i} outside the known range {}..={}",
                        known[0].0,
                        known[known.len() - 1].0
                    ))
                })
            })
            .collect()
    }
}
