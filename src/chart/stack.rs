//! Stacked layout of per-year group counts.
//!
//! Produces one layer per group with `(lower, upper)` bounds for every year.
//! The order decides which layer sits at the bottom; the offset decides the
//! baseline the first layer starts from.

use crate::models::{GroupKey, YearSummary};
use serde::{Deserialize, Serialize};

/// Stacking order of the layers, bottom first.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StackOrder {
    /// Fixed group order.
    None,
    /// Smallest overall layer at the bottom.
    #[default]
    Ascending,
    /// Largest overall layer at the bottom.
    Descending,
    /// Fixed group order, reversed.
    Reverse,
}

/// Baseline of the stack.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum StackOffset {
    /// Zero baseline.
    #[default]
    None,
    /// Zero baseline, each year normalized to a total of 1.
    Expand,
    /// Baseline centred around zero.
    Silhouette,
    /// Baseline chosen to minimise weighted layer slope.
    Wiggle,
}

/// One year of a stacked layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StackPoint {
    pub year: i32,
    pub lower: f64,
    pub upper: f64,
}

/// A group's band across all years.
#[derive(Debug, Clone, PartialEq)]
pub struct Layer {
    pub key: GroupKey,
    /// Position in the stacking order, 0 at the bottom.
    pub rank: usize,
    pub points: Vec<StackPoint>,
}

impl StackOrder {
    /// Layer indices from bottom to top.
    fn arrange(self, values: &[Vec<f64>]) -> Vec<usize> {
        let natural: Vec<usize> = (0..values.len()).collect();
        match self {
            StackOrder::None => natural,
            StackOrder::Reverse => natural.into_iter().rev().collect(),
            StackOrder::Ascending => ascending(values),
            StackOrder::Descending => ascending(values).into_iter().rev().collect(),
        }
    }
}

fn ascending(values: &[Vec<f64>]) -> Vec<usize> {
    let sums: Vec<f64> = values.iter().map(|row| row.iter().sum()).collect();
    let mut order: Vec<usize> = (0..values.len()).collect();
    // Stable sort: equal sums keep group order.
    order.sort_by(|&a, &b| sums[a].total_cmp(&sums[b]));
    order
}

impl StackOffset {
    /// Rewrite `values` in place if needed and return the per-year baseline.
    /// `values` rows are already in stacking order.
    fn baseline(self, values: &mut [Vec<f64>], columns: usize) -> Vec<f64> {
        match self {
            StackOffset::None => vec![0.0; columns],
            StackOffset::Expand => {
                for j in 0..columns {
                    let total: f64 = values.iter().map(|row| row[j]).sum();
                    if total != 0.0 {
                        for row in values.iter_mut() {
                            row[j] /= total;
                        }
                    }
                }
                vec![0.0; columns]
            }
            StackOffset::Silhouette => (0..columns)
                .map(|j| -values.iter().map(|row| row[j]).sum::<f64>() / 2.0)
                .collect(),
            StackOffset::Wiggle => wiggle(values, columns),
        }
    }
}

/// Byron & Wattenberg baseline: each step moves the baseline against the
/// weighted mean change of the layer midlines.
fn wiggle(values: &[Vec<f64>], columns: usize) -> Vec<f64> {
    let mut baseline = vec![0.0; columns];
    if values.is_empty() || columns == 0 {
        return baseline;
    }

    let mut y = 0.0;
    for j in 1..columns {
        let mut weight = 0.0;
        let mut slope = 0.0;
        for (i, row) in values.iter().enumerate() {
            let current = row[j];
            let mut delta = (current - row[j - 1]) / 2.0;
            for below in &values[..i] {
                delta += below[j] - below[j - 1];
            }
            weight += current;
            slope += delta * current;
        }
        baseline[j - 1] = y;
        if weight != 0.0 {
            y -= slope / weight;
        }
    }
    baseline[columns - 1] = y;
    baseline
}

/// Stack the counts of `keys` across `summaries`.
///
/// Layers come back in `keys` order; use [`Layer::rank`] for their vertical
/// position.
pub fn stack(
    summaries: &[YearSummary],
    keys: &[GroupKey],
    order: StackOrder,
    offset: StackOffset,
) -> Vec<Layer> {
    let columns = summaries.len();
    let raw: Vec<Vec<f64>> = keys
        .iter()
        .map(|&key| summaries.iter().map(|s| f64::from(s.count(key))).collect())
        .collect();

    let arrangement = order.arrange(&raw);
    let mut ordered: Vec<Vec<f64>> = arrangement.iter().map(|&i| raw[i].clone()).collect();
    let baseline = offset.baseline(&mut ordered, columns);

    let mut layers: Vec<Option<Layer>> = vec![None; keys.len()];
    let mut floor = baseline;
    for (rank, (&index, values)) in arrangement.iter().zip(&ordered).enumerate() {
        let points = summaries
            .iter()
            .zip(values)
            .zip(floor.iter_mut())
            .map(|((summary, &value), lower)| {
                let point = StackPoint {
                    year: summary.year,
                    lower: *lower,
                    upper: *lower + value,
                };
                *lower = point.upper;
                point
            })
            .collect();
        layers[index] = Some(Layer {
            key: keys[index],
            rank,
            points,
        });
    }

    layers.into_iter().flatten().collect()
}

/// Lowest lower bound and highest upper bound over all layers.
pub fn extent(layers: &[Layer]) -> Option<(f64, f64)> {
    layers
        .iter()
        .flat_map(|layer| layer.points.iter())
        .fold(None, |acc, p| match acc {
            None => Some((p.lower, p.upper)),
            Some((lo, hi)) => Some((lo.min(p.lower), hi.max(p.upper))),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(year: i32, counts: [u32; 4]) -> YearSummary {
        let mut s = YearSummary::new(year);
        for (key, count) in GroupKey::ALL.iter().zip(counts) {
            for _ in 0..count {
                s.record(*key);
            }
        }
        s
    }

    fn sample() -> Vec<YearSummary> {
        vec![
            summary(2000, [10, 2, 1, 0]),
            summary(2001, [8, 4, 0, 1]),
            summary(2002, [12, 3, 2, 2]),
        ]
    }

    #[test]
    fn test_stack_none_is_cumulative() {
        let layers = stack(&sample(), &GroupKey::ALL, StackOrder::None, StackOffset::None);
        assert_eq!(layers.len(), 4);
        assert_eq!(layers[0].key, GroupKey::Caucasian);
        assert_eq!(layers[0].rank, 0);
        assert_eq!(layers[0].points[0].lower, 0.0);
        assert_eq!(layers[0].points[0].upper, 10.0);
        assert_eq!(layers[1].points[0].lower, 10.0);
        assert_eq!(layers[1].points[0].upper, 12.0);
        assert_eq!(layers[3].points[2].upper, 19.0);
    }

    #[test]
    fn test_stack_ascending_puts_smallest_at_bottom() {
        let layers = stack(
            &sample(),
            &GroupKey::ALL,
            StackOrder::Ascending,
            StackOffset::None,
        );
        // Sums: caucasian 30, afro 9, hispanic 3, asian 3 (tie keeps order).
        let rank = |key: GroupKey| layers[key.index()].rank;
        assert_eq!(rank(GroupKey::Hispanic), 0);
        assert_eq!(rank(GroupKey::Asian), 1);
        assert_eq!(rank(GroupKey::Afrodescendant), 2);
        assert_eq!(rank(GroupKey::Caucasian), 3);

        // Top of the stack is the year total.
        let top = &layers[GroupKey::Caucasian.index()];
        assert_eq!(top.points[0].upper, 13.0);
        assert_eq!(top.points[2].upper, 19.0);
    }

    #[test]
    fn test_stack_descending_and_reverse() {
        let layers = stack(
            &sample(),
            &GroupKey::ALL,
            StackOrder::Descending,
            StackOffset::None,
        );
        assert_eq!(layers[GroupKey::Caucasian.index()].rank, 0);

        let layers = stack(&sample(), &GroupKey::ALL, StackOrder::Reverse, StackOffset::None);
        assert_eq!(layers[GroupKey::Asian.index()].rank, 0);
        assert_eq!(layers[GroupKey::Caucasian.index()].rank, 3);
    }

    #[test]
    fn test_stack_silhouette_is_centred() {
        let data = sample();
        let layers = stack(&data, &GroupKey::ALL, StackOrder::None, StackOffset::Silhouette);
        for (j, s) in data.iter().enumerate() {
            let bottom = layers[0].points[j].lower;
            let top = layers[3].points[j].upper;
            assert_eq!(bottom, -(s.nominees_total as f64) / 2.0);
            assert!((top + bottom).abs() < 1e-9);
        }
    }

    #[test]
    fn test_stack_expand_normalizes() {
        let layers = stack(&sample(), &GroupKey::ALL, StackOrder::None, StackOffset::Expand);
        for j in 0..3 {
            assert!((layers[3].points[j].upper - 1.0).abs() < 1e-9);
            assert_eq!(layers[0].points[j].lower, 0.0);
        }
    }

    #[test]
    fn test_stack_wiggle_keeps_thickness() {
        let data = sample();
        let layers = stack(&data, &GroupKey::ALL, StackOrder::None, StackOffset::Wiggle);
        // First column always starts at zero.
        assert_eq!(layers[0].points[0].lower, 0.0);
        for layer in &layers {
            for (p, s) in layer.points.iter().zip(&data) {
                assert!((p.upper - p.lower - s.count(layer.key) as f64).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_wiggle_constant_data_is_flat() {
        let data = vec![summary(2000, [3, 2, 1, 0]), summary(2001, [3, 2, 1, 0])];
        let layers = stack(&data, &GroupKey::ALL, StackOrder::None, StackOffset::Wiggle);
        assert_eq!(layers[0].points[1].lower, 0.0);
    }

    #[test]
    fn test_extent() {
        let layers = stack(&sample(), &GroupKey::ALL, StackOrder::None, StackOffset::None);
        assert_eq!(extent(&layers), Some((0.0, 19.0)));
        assert_eq!(extent(&[]), None);
    }

    #[test]
    fn test_stack_empty() {
        let layers = stack(&[], &GroupKey::ALL, StackOrder::Ascending, StackOffset::Wiggle);
        assert_eq!(layers.len(), 4);
        assert!(layers.iter().all(|l| l.points.is_empty()));
        assert_eq!(extent(&layers), None);
    }
}
