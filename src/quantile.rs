/// Quantile color scale
///
/// Cut points are the `p + 1` quantiles of the count distribution at levels
/// `0, 1/p, ..., 1`, linearly interpolated between order statistics. The same
/// edges produce both the per-cell bucket and the legend ranges.
///
/// Bucket assignment drops duplicate edges, so a distribution with few distinct
/// values uses fewer than `p` buckets. A count `x` lands in interval `i` when
/// `edge[i] < x <= edge[i + 1]`; the lowest interval also takes `edge[0]`.
/// Equal counts therefore always share a bucket, whatever their order.
///
/// Legend bounds are the raw edges rounded half to even and always number `p`.

use serde::{Deserialize, Serialize};

use crate::aggregate::HexCell;
use crate::error::{HeatmapError, Result};

/// One legend range, shown whether or not any cell falls into it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub bucket_index: usize,
    pub lower_bound: i64,
    pub upper_bound: i64,
}

impl LegendEntry {
    pub fn label(&self) -> String {
        format!("{} - {}", self.lower_bound, self.upper_bound)
    }
}

/// Result of classifying one distribution
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Bucket per input value, in input order
    pub buckets: Vec<usize>,
    pub legend: Vec<LegendEntry>,
    /// Unrounded cut points, `palette_size + 1` of them
    pub edges: Vec<f64>,
}

impl Classification {
    /// Number of distinct buckets actually assigned
    pub fn used_buckets(&self) -> usize {
        let mut seen: Vec<usize> = self.buckets.clone();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }
}

/// Linear interpolation that stays monotone near `t = 1`
fn lerp(a: f64, b: f64, t: f64) -> f64 {
    let diff = b - a;
    if t >= 0.5 { b - diff * (1.0 - t) } else { a + diff * t }
}

/// Quantile of already-sorted `sorted` at `level` in `[0, 1]`, interpolated
/// at rank `level * (n - 1)`.
pub fn quantile_sorted(sorted: &[f64], level: f64) -> Result<f64> {
    let last = match sorted.len() {
        0 => return Err(HeatmapError::EmptyDistribution),
        n => n - 1,
    };

    let rank = level.clamp(0.0, 1.0) * last as f64;
    let below = (rank.floor() as usize).min(last);
    let above = (below + 1).min(last);
    Ok(lerp(sorted[below], sorted[above], rank - below as f64))
}

/// Evenly spaced levels `0, 1/p, ..., 1`
pub fn quantile_levels(palette_size: usize) -> Vec<f64> {
    let step = 1.0 / palette_size as f64;
    (0..=palette_size)
        .map(|i| if i == palette_size { 1.0 } else { i as f64 * step })
        .collect()
}

/// The `palette_size + 1` cut points of `values`
pub fn cut_points(values: &[f64], palette_size: usize) -> Result<Vec<f64>> {
    if palette_size == 0 {
        return Err(HeatmapError::InvalidPaletteSize(palette_size));
    }
    if values.is_empty() {
        return Err(HeatmapError::EmptyDistribution);
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    quantile_levels(palette_size)
        .into_iter()
        .map(|level| quantile_sorted(&sorted, level))
        .collect()
}

/// Python-style `round()`: halves go to the even neighbour
pub fn round_bound(value: f64) -> i64 {
    value.round_ties_even() as i64
}

fn bucket_of(value: f64, distinct_edges: &[f64]) -> usize {
    if distinct_edges.len() < 2 || value <= distinct_edges[0] {
        return 0;
    }
    let above = distinct_edges.partition_point(|edge| *edge < value);
    (above - 1).min(distinct_edges.len() - 2)
}

/// Classifies raw `values` into `palette_size` quantile buckets.
pub fn classify_values(values: &[f64], palette_size: usize) -> Result<Classification> {
    let edges = cut_points(values, palette_size)?;

    let mut distinct = edges.clone();
    distinct.dedup();

    let buckets = values.iter().map(|v| bucket_of(*v, &distinct)).collect();

    let legend = edges
        .windows(2)
        .enumerate()
        .map(|(bucket_index, pair)| LegendEntry {
            bucket_index,
            lower_bound: round_bound(pair[0]),
            upper_bound: round_bound(pair[1]),
        })
        .collect();

    Ok(Classification {
        buckets,
        legend,
        edges,
    })
}

pub fn classify_counts(counts: &[u64], palette_size: usize) -> Result<Classification> {
    let values: Vec<f64> = counts.iter().map(|c| *c as f64).collect();
    classify_values(&values, palette_size)
}

/// Classifies `cells` by their counts; `buckets[i]` belongs to `cells[i]`.
pub fn classify<C>(cells: &[HexCell<C>], palette_size: usize) -> Result<Classification> {
    let counts: Vec<u64> = cells.iter().map(|cell| cell.count).collect();
    classify_counts(&counts, palette_size)
}
