use crate::error::SummaryError;
use crate::hdi::hdi;
use crate::samples::SampleMatrix;
use crate::util::mean;
use serde::Serialize;

/// Score states in `score_raw` column order, relative to 0:0. The last column ("other D") is left
/// out because its intervals are too wide to be useful.
pub const SCORES: [&str; 10] = [
    "0:1", "0:2", "1:0", "1:1", "1:2", "2:0", "2:1", "2:2", "other W", "other L",
];

pub const SCORE_WIDTH: f64 = 0.95;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreEffect {
    pub score: &'static str,
    /// Shooting-rate multiplier relative to 0:0.
    pub mean: f64,
    /// Distance from the mean down to the lower bound.
    pub below: f64,
    /// Distance from the mean up to the upper bound.
    pub above: f64,
}

/// Score-state multipliers with 95% intervals, smallest mean first.
pub fn score_effects(score_raw: &SampleMatrix) -> Result<Vec<ScoreEffect>, SummaryError> {
    if score_raw.n_units() < SCORES.len() {
        return Err(SummaryError::shape(
            format!("at least {} score states", SCORES.len()),
            score_raw.n_units(),
        ));
    }

    let mut effects = SCORES
        .iter()
        .enumerate()
        .map(|(idx, &score)| -> Result<ScoreEffect, SummaryError> {
            let draws: Vec<f64> = score_raw.column(idx).map(f64::exp).collect();
            let interval = hdi(&draws, SCORE_WIDTH)?;
            let mean = mean(draws.iter().copied());
            Ok(ScoreEffect {
                score,
                mean,
                below: (interval.lower - mean).abs(),
                above: (interval.upper - mean).abs(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    effects.sort_by(|a, b| a.mean.total_cmp(&b.mean));
    Ok(effects)
}

#[cfg(test)]
mod tests {
    use super::{score_effects, SCORES};
    use crate::error::SummaryError;
    use crate::samples::SampleMatrix;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_sorted_by_mean() {
        // column i holds ln(i + 1), plus a wildly uncertain "other D"
        let rows = (0..20)
            .map(|draw| {
                let mut row: Vec<f64> = (0..10).map(|i| f64::from(10 - i).ln()).collect();
                row.push(f64::from(draw) * 10.0);
                row
            })
            .collect();
        let effects = score_effects(&SampleMatrix::from_rows(rows).unwrap()).unwrap();
        assert_eq!(effects.len(), SCORES.len());
        assert_eq!(effects[0].score, "other L");
        assert_eq!(effects[9].score, "0:1");
        assert_approx_eq!(effects[0].mean, 1.0);
        assert_approx_eq!(effects[9].mean, 10.0);
        for effect in &effects {
            assert_approx_eq!(effect.below, 0.0);
            assert_approx_eq!(effect.above, 0.0);
        }
        assert!(effects.windows(2).all(|w| w[0].mean <= w[1].mean));
    }

    #[test]
    fn test_error_bars() {
        let rows = vec![vec![0.0; 10], vec![2.0_f64.ln(); 10]];
        let effects = score_effects(&SampleMatrix::from_rows(rows).unwrap()).unwrap();
        for effect in effects {
            assert_approx_eq!(effect.mean, 1.5);
            assert_approx_eq!(effect.below, 0.5);
            assert_approx_eq!(effect.above, 0.5);
        }
    }

    #[test]
    fn test_too_few_columns() {
        let matrix = SampleMatrix::new(3, 9, vec![0.0; 27]).unwrap();
        assert!(matches!(
            score_effects(&matrix),
            Err(SummaryError::ShapeMismatch { .. })
        ));
    }
}
