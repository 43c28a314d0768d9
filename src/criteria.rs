//! Information criteria over a log-likelihood matrix: one row per posterior draw, one column per
//! observation.

use crate::error::SummaryError;
use crate::samples::SampleMatrix;
use crate::util::{log_mean_exp, mean, variance};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WaicTerms {
    /// Log pointwise predictive density.
    pub lppd: f64,
    /// Effective number of parameters.
    pub p_waic: f64,
}

impl WaicTerms {
    pub fn waic(&self) -> f64 {
        -2.0 * (self.lppd - self.p_waic)
    }
}

/// Akaike information criterion. `n_params` holds one value per draw and should be constant.
#[instrument(skip_all, fields(draws = log_lik.n_draws(), observations = log_lik.n_units()))]
pub fn aic(log_lik: &SampleMatrix, n_params: &[f64]) -> Result<f64, SummaryError> {
    check_nonempty(log_lik)?;
    if n_params.len() != log_lik.n_draws() {
        return Err(SummaryError::shape(
            format!("{} n_params draws", log_lik.n_draws()),
            n_params.len(),
        ));
    }
    if n_params.iter().any(|k| k != &n_params[0]) {
        warn!("n_params is not constant across draws, using its mean");
    }

    let ll: f64 = per_column(log_lik, |column| mean(column.iter().copied()))
        .into_iter()
        .sum();
    let k = mean(n_params.iter().copied());
    Ok(-2.0 * (ll - k))
}

/// Widely applicable information criterion (McElreath, "Statistical Rethinking", 6.4).
pub fn waic(log_lik: &SampleMatrix) -> Result<f64, SummaryError> {
    waic_terms(log_lik).map(|terms| terms.waic())
}

#[instrument(skip_all, fields(draws = log_lik.n_draws(), observations = log_lik.n_units()))]
pub fn waic_terms(log_lik: &SampleMatrix) -> Result<WaicTerms, SummaryError> {
    check_nonempty(log_lik)?;
    let terms = per_column(log_lik, |column| (log_mean_exp(column), variance(column)));
    Ok(WaicTerms {
        lppd: terms.iter().map(|(lppd, _)| lppd).sum(),
        p_waic: terms.iter().map(|(_, var)| var).sum(),
    })
}

fn check_nonempty(log_lik: &SampleMatrix) -> Result<(), SummaryError> {
    if log_lik.is_empty() {
        Err(SummaryError::InvalidInput(format!(
            "log-likelihood matrix is {}x{}",
            log_lik.n_draws(),
            log_lik.n_units()
        )))
    } else {
        Ok(())
    }
}

/// Reduces each column in parallel. Results come back in column order so the caller's sum is
/// the same on every run.
fn per_column<T, F>(matrix: &SampleMatrix, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(&[f64]) -> T + Sync,
{
    (0..matrix.n_units())
        .into_par_iter()
        .map(|unit| f(&matrix.column(unit).collect::<Vec<_>>()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{aic, waic, waic_terms};
    use crate::error::SummaryError;
    use crate::samples::SampleMatrix;
    use assert_approx_eq::assert_approx_eq;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    fn constant(n_draws: usize, n_units: usize, value: f64) -> SampleMatrix {
        SampleMatrix::new(n_draws, n_units, vec![value; n_draws * n_units]).unwrap()
    }

    fn noisy(n_draws: usize, n_units: usize, center: f64, seed: u64) -> SampleMatrix {
        let mut rng = StdRng::seed_from_u64(seed);
        let data = (0..n_draws * n_units)
            .map(|_| center + rng.gen_range(-0.5, 0.5))
            .collect();
        SampleMatrix::new(n_draws, n_units, data).unwrap()
    }

    #[test]
    fn test_aic_constant() {
        let log_lik = constant(1000, 5, -1.0);
        assert_approx_eq!(aic(&log_lik, &[3.0; 1000]).unwrap(), 16.0, f64::EPSILON);
    }

    #[test]
    fn test_waic_constant() {
        let log_lik = constant(1000, 5, -1.0);
        let terms = waic_terms(&log_lik).unwrap();
        assert_eq!(terms.p_waic, 0.0);
        assert_approx_eq!(terms.lppd, -5.0, f64::EPSILON);
        assert_approx_eq!(waic(&log_lik).unwrap(), 10.0, f64::EPSILON);
    }

    #[test]
    fn test_deterministic() {
        let log_lik = noisy(400, 37, -2.0, 3);
        let n_params = vec![12.0; 400];
        let first = aic(&log_lik, &n_params).unwrap();
        let first_waic = waic(&log_lik).unwrap();
        for _ in 0..10 {
            assert_eq!(aic(&log_lik, &n_params).unwrap().to_bits(), first.to_bits());
            assert_eq!(waic(&log_lik).unwrap().to_bits(), first_waic.to_bits());
        }
    }

    #[test]
    fn test_waic_large_magnitude() {
        let shift = 1000.0;
        let log_lik = noisy(500, 8, -shift, 11);
        let terms = waic_terms(&log_lik).unwrap();
        assert!(terms.lppd.is_finite());
        assert!(terms.p_waic.is_finite());

        // The naive formula underflows at -1000, so apply it to the shifted draws and shift back.
        let mut naive_lppd = 0.0;
        for unit in 0..log_lik.n_units() {
            let column: Vec<f64> = log_lik.column(unit).collect();
            let mean_exp =
                column.iter().map(|x| (x + shift).exp()).sum::<f64>() / column.len() as f64;
            naive_lppd += mean_exp.ln() - shift;
        }
        assert!(((terms.lppd - naive_lppd) / naive_lppd).abs() < 1e-6);

        let moderate = noisy(500, 8, -3.0, 11);
        let naive_moderate: f64 = (0..moderate.n_units())
            .map(|unit| {
                let column: Vec<f64> = moderate.column(unit).collect();
                (column.iter().map(|x| x.exp()).sum::<f64>() / column.len() as f64).ln()
            })
            .sum();
        assert_approx_eq!(waic_terms(&moderate).unwrap().lppd, naive_moderate, 1e-9);
    }

    #[test]
    fn test_aic_non_constant_params() {
        let log_lik = constant(4, 2, -1.0);
        assert_approx_eq!(aic(&log_lik, &[2.0, 2.0, 4.0, 4.0]).unwrap(), 10.0);
    }

    #[test]
    fn test_errors() {
        let empty = SampleMatrix::new(0, 3, Vec::new()).unwrap();
        assert!(matches!(aic(&empty, &[]), Err(SummaryError::InvalidInput(_))));
        assert!(matches!(waic(&empty), Err(SummaryError::InvalidInput(_))));

        let no_units = SampleMatrix::new(3, 0, Vec::new()).unwrap();
        assert!(matches!(waic(&no_units), Err(SummaryError::InvalidInput(_))));

        let log_lik = constant(10, 2, -1.0);
        assert!(matches!(
            aic(&log_lik, &[3.0; 9]),
            Err(SummaryError::ShapeMismatch { .. })
        ));
    }
}
