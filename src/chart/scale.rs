//! Continuous linear scales and "nice" tick generation.

const E10: f64 = 7.071_067_811_865_476; // sqrt(50)
const E5: f64 = 3.162_277_660_168_379_5; // sqrt(10)
const E2: f64 = std::f64::consts::SQRT_2;

/// Maps a numeric domain onto an output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Map a domain value into the range.
    ///
    /// A zero-width domain maps everything to the middle of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d1 == d0 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Roughly `count` human-friendly tick values inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        ticks(self.domain.0, self.domain.1, count)
    }

    /// Spacing between the ticks [`LinearScale::ticks`] would return.
    pub fn tick_step(&self, count: usize) -> f64 {
        let (d0, d1) = self.domain;
        tick_step(d0.min(d1), d0.max(d1), count)
    }
}

/// `(first index, last index, increment)`; a negative increment means
/// ticks are `i / -inc` rather than `i * inc`, which keeps decimals exact.
fn tick_spec(start: f64, stop: f64, count: f64) -> (i64, i64, f64) {
    let step = (stop - start) / count.max(0.0);
    let power = step.log10().floor();
    let error = step / 10f64.powf(power);
    let factor = if error >= E10 {
        10.0
    } else if error >= E5 {
        5.0
    } else if error >= E2 {
        2.0
    } else {
        1.0
    };

    let (mut i1, mut i2, inc);
    if power < 0.0 {
        let inv = 10f64.powf(-power) / factor;
        i1 = (start * inv).round() as i64;
        i2 = (stop * inv).round() as i64;
        if (i1 as f64) / inv < start {
            i1 += 1;
        }
        if (i2 as f64) / inv > stop {
            i2 -= 1;
        }
        inc = -inv;
    } else {
        let step = 10f64.powf(power) * factor;
        i1 = (start / step).round() as i64;
        i2 = (stop / step).round() as i64;
        if (i1 as f64) * step < start {
            i1 += 1;
        }
        if (i2 as f64) * step > stop {
            i2 -= 1;
        }
        inc = step;
    }

    if i2 < i1 && (0.5..2.0).contains(&count) {
        return tick_spec(start, stop, count * 2.0);
    }
    (i1, i2, inc)
}

/// Nice tick values between `start` and `stop` (either order).
pub fn ticks(start: f64, stop: f64, count: usize) -> Vec<f64> {
    if count == 0 || !start.is_finite() || !stop.is_finite() {
        return Vec::new();
    }
    if start == stop {
        return vec![start];
    }

    let reverse = stop < start;
    let (lo, hi) = if reverse { (stop, start) } else { (start, stop) };
    let (i1, i2, inc) = tick_spec(lo, hi, count as f64);
    if i2 < i1 {
        return Vec::new();
    }

    let mut values: Vec<f64> = (i1..=i2)
        .map(|i| {
            if inc < 0.0 {
                i as f64 / -inc
            } else {
                i as f64 * inc
            }
        })
        .collect();
    if reverse {
        values.reverse();
    }
    values
}

/// Absolute tick spacing for `count` ticks over `[start, stop]`.
pub fn tick_step(start: f64, stop: f64, count: usize) -> f64 {
    if count == 0 || start == stop {
        return 0.0;
    }
    let (_, _, inc) = tick_spec(start, stop, count as f64);
    if inc < 0.0 {
        1.0 / -inc
    } else {
        inc
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let scale = LinearScale::new((1930.0, 2020.0), (50.0, 1140.0));
        assert_eq!(scale.apply(1930.0), 50.0);
        assert_eq!(scale.apply(2020.0), 1140.0);
        assert_eq!(scale.apply(1975.0), 595.0);
    }

    #[test]
    fn test_inverted_range() {
        let scale = LinearScale::new((0.0, 20.0), (550.0, 100.0));
        assert_eq!(scale.apply(0.0), 550.0);
        assert_eq!(scale.apply(20.0), 100.0);
        assert_eq!(scale.apply(10.0), 325.0);
    }

    #[test]
    fn test_degenerate_domain_maps_to_midpoint() {
        let scale = LinearScale::new((1990.0, 1990.0), (50.0, 150.0));
        assert_eq!(scale.apply(1990.0), 100.0);
        assert_eq!(scale.ticks(10), vec![1990.0]);
    }

    #[test]
    fn test_ticks_integers() {
        assert_eq!(
            ticks(0.0, 10.0, 10),
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]
        );
        assert_eq!(ticks(0.0, 20.0, 5), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
    }

    #[test]
    fn test_ticks_years() {
        let t = ticks(1928.0, 2019.0, 10);
        assert_eq!(t.first(), Some(&1930.0));
        assert_eq!(t.last(), Some(&2010.0));
        assert!(t.windows(2).all(|w| w[1] - w[0] == 10.0));
    }

    #[test]
    fn test_ticks_decimals_are_exact() {
        let t = ticks(0.0, 1.0, 10);
        assert_eq!(t.len(), 11);
        assert_eq!(t[3], 0.3);
        assert_eq!(t[7], 0.7);
        assert_eq!(tick_step(0.0, 1.0, 10), 0.1);
    }

    #[test]
    fn test_ticks_reversed_and_empty() {
        assert_eq!(ticks(10.0, 0.0, 2), vec![10.0, 5.0, 0.0]);
        assert!(ticks(0.0, 10.0, 0).is_empty());
        assert!(ticks(f64::NAN, 10.0, 5).is_empty());
    }
}
