use crate::error::SummaryError;
use serde::Serialize;
use tracing::trace;

pub const DEFAULT_WIDTH: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CredibleInterval {
    pub lower: f64,
    pub upper: f64,
}

impl CredibleInterval {
    #[cfg(test)]
    pub fn contains(&self, other: &CredibleInterval) -> bool {
        self.lower <= other.lower && other.upper <= self.upper
    }
}

/// "Highest density interval" of a vector of draws.
///
/// This is really an equal-tailed interval: the draws are sorted and `(1 - width) / 2` of them
/// are trimmed from each end. Both bounds are always observed draws. Callers depend on this exact
/// definition, so don't swap in a narrowest-interval search.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn hdi(vector: &[f64], width: f64) -> Result<CredibleInterval, SummaryError> {
    if !(width > 0.0 && width <= 1.0) {
        return Err(SummaryError::OutOfRange {
            width,
            reason: "width must be in (0, 1]",
        });
    }
    if vector.is_empty() {
        return Err(SummaryError::InvalidInput("no draws".into()));
    }
    if vector.iter().any(|x| x.is_nan()) {
        return Err(SummaryError::InvalidInput("draws contain NaN".into()));
    }

    let mut sorted = vector.to_vec();
    sorted.sort_by(f64::total_cmp);

    let size = sorted.len();
    let left = ((1.0 - width) / 2.0 * size as f64) as usize;
    let right = ((width + (1.0 - width) / 2.0) * size as f64) as usize;
    if right >= size {
        trace!(right, size, width, "clamping right index");
    }
    let right = right.min(size - 1);
    debug_assert!(left <= right);

    Ok(CredibleInterval {
        lower: sorted[left],
        upper: sorted[right],
    })
}

#[cfg(test)]
mod tests {
    use super::{hdi, CredibleInterval, DEFAULT_WIDTH};
    use crate::error::SummaryError;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn one_to_ten() -> Vec<f64> {
        (1..=10).map(f64::from).collect()
    }

    #[test]
    fn test_one_to_ten() {
        assert_eq!(
            hdi(&one_to_ten(), DEFAULT_WIDTH).unwrap(),
            CredibleInterval {
                lower: 3.0,
                upper: 8.0
            }
        );

        let mut shuffled = one_to_ten();
        shuffled.reverse();
        shuffled.swap(2, 7);
        assert_eq!(hdi(&shuffled, 0.5).unwrap(), hdi(&one_to_ten(), 0.5).unwrap());
    }

    #[test]
    fn test_full_width() {
        let interval = hdi(&one_to_ten(), 1.0).unwrap();
        assert_eq!((interval.lower, interval.upper), (1.0, 10.0));
        let interval = hdi(&one_to_ten(), 0.999_999).unwrap();
        assert_eq!((interval.lower, interval.upper), (1.0, 10.0));
    }

    #[test]
    fn test_tiny_vectors() {
        let interval = hdi(&[4.2], 0.5).unwrap();
        assert_eq!((interval.lower, interval.upper), (4.2, 4.2));
        let interval = hdi(&[2.0, 1.0], 0.5).unwrap();
        assert_eq!((interval.lower, interval.upper), (1.0, 2.0));
        let interval = hdi(&[3.0, 1.0, 2.0], 0.1).unwrap();
        assert_eq!((interval.lower, interval.upper), (2.0, 2.0));
    }

    #[test]
    fn test_errors() {
        assert!(matches!(
            hdi(&[], 0.5),
            Err(SummaryError::InvalidInput(_))
        ));
        assert!(matches!(
            hdi(&[1.0, f64::NAN], 0.5),
            Err(SummaryError::InvalidInput(_))
        ));
        for width in &[0.0, -0.5, 1.5, f64::NAN] {
            assert!(matches!(
                hdi(&one_to_ten(), *width),
                Err(SummaryError::OutOfRange { .. })
            ));
        }
    }

    #[test]
    fn test_monotone_and_observed() {
        let mut rng = StdRng::seed_from_u64(17);
        let draws: Vec<f64> = (0..537).map(|_| rng.gen_range(-3.0, 3.0)).collect();

        let widths = [0.05, 0.1, 0.25, 0.5, 0.5, 0.8, 0.9, 0.95, 0.99, 1.0];
        let intervals: Vec<CredibleInterval> =
            widths.iter().map(|w| hdi(&draws, *w).unwrap()).collect();
        for pair in intervals.windows(2) {
            assert!(pair[1].contains(&pair[0]), "{:?}", pair);
        }
        for interval in &intervals {
            assert!(interval.lower <= interval.upper);
            assert!(draws.contains(&interval.lower));
            assert!(draws.contains(&interval.upper));
        }

        let min = draws.iter().copied().fold(f64::INFINITY, f64::min);
        let max = draws.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        assert_eq!(intervals.last().unwrap(), &CredibleInterval { lower: min, upper: max });
    }
}
