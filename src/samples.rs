use crate::error::SummaryError;
use serde::{Deserialize, Serialize};
use std::convert::TryFrom;

/// Posterior draws of one variable: each row is a draw, each column a modeled unit (a team, an
/// observation, ...). Stored row-major.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawSampleMatrix")]
pub struct SampleMatrix {
    n_draws: usize,
    n_units: usize,
    data: Vec<f64>,
}

/// Decoded fields, checked by `SampleMatrix::new` before use.
#[derive(Deserialize)]
struct RawSampleMatrix {
    n_draws: usize,
    n_units: usize,
    data: Vec<f64>,
}

impl TryFrom<RawSampleMatrix> for SampleMatrix {
    type Error = SummaryError;

    fn try_from(raw: RawSampleMatrix) -> Result<Self, Self::Error> {
        SampleMatrix::new(raw.n_draws, raw.n_units, raw.data)
    }
}

impl SampleMatrix {
    pub fn new(n_draws: usize, n_units: usize, data: Vec<f64>) -> Result<Self, SummaryError> {
        if data.len() != n_draws * n_units {
            return Err(SummaryError::shape(
                format!("{} values ({}x{})", n_draws * n_units, n_draws, n_units),
                format!("{} values", data.len()),
            ));
        }
        Ok(SampleMatrix {
            n_draws,
            n_units,
            data,
        })
    }

    #[cfg(test)]
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, SummaryError> {
        let n_draws = rows.len();
        let n_units = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_draws * n_units);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != n_units {
                return Err(SummaryError::shape(
                    format!("{} units per draw", n_units),
                    format!("{} units in draw {}", row.len(), i),
                ));
            }
            data.extend(row);
        }
        SampleMatrix::new(n_draws, n_units, data)
    }

    /// A single-column matrix holding draws of a scalar.
    pub fn from_vector(draws: Vec<f64>) -> Self {
        SampleMatrix {
            n_draws: draws.len(),
            n_units: 1,
            data: draws,
        }
    }

    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    pub fn n_units(&self) -> usize {
        self.n_units
    }

    pub fn is_empty(&self) -> bool {
        self.n_draws == 0 || self.n_units == 0
    }

    #[cfg(test)]
    pub fn row(&self, draw: usize) -> &[f64] {
        &self.data[draw * self.n_units..(draw + 1) * self.n_units]
    }

    pub fn column(&self, unit: usize) -> impl Iterator<Item = f64> + '_ {
        assert!(unit < self.n_units, "unit {} out of {}", unit, self.n_units);
        self.data.iter().skip(unit).step_by(self.n_units).copied()
    }

    pub fn values(&self) -> &[f64] {
        &self.data
    }

    /// Applies a deterministic transform to every draw.
    pub fn map<F>(&self, f: F) -> SampleMatrix
    where
        F: Fn(f64) -> f64,
    {
        SampleMatrix {
            n_draws: self.n_draws,
            n_units: self.n_units,
            data: self.data.iter().map(|x| f(*x)).collect(),
        }
    }

    /// Mean over every entry of the matrix.
    pub fn grand_mean(&self) -> f64 {
        crate::util::mean(self.data.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::SampleMatrix;
    use crate::error::SummaryError;

    #[test]
    fn test_from_rows() {
        let matrix = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]])
            .unwrap();
        assert_eq!(matrix.n_draws(), 3);
        assert_eq!(matrix.n_units(), 2);
        assert_eq!(matrix.row(1), &[3.0, 4.0]);
        assert_eq!(matrix.column(0).collect::<Vec<_>>(), vec![1.0, 3.0, 5.0]);
        assert_eq!(matrix.column(1).collect::<Vec<_>>(), vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_ragged_rows() {
        let err = SampleMatrix::from_rows(vec![vec![1.0, 2.0], vec![3.0]]).unwrap_err();
        assert!(matches!(err, SummaryError::ShapeMismatch { .. }));
        assert!(SampleMatrix::new(2, 2, vec![0.0; 3]).is_err());
    }

    #[test]
    fn test_empty() {
        assert!(SampleMatrix::from_rows(Vec::new()).unwrap().is_empty());
        assert!(SampleMatrix::new(4, 0, Vec::new()).unwrap().is_empty());
        assert!(!SampleMatrix::from_vector(vec![1.0]).is_empty());
    }

    #[test]
    fn test_deserialize_checks_shape() {
        let matrix: SampleMatrix =
            serde_json::from_str(r#"{"n_draws":2,"n_units":2,"data":[1,2,3,4]}"#).unwrap();
        assert_eq!(matrix.column(1).collect::<Vec<_>>(), vec![2.0, 4.0]);

        let short = r#"{"n_draws":2,"n_units":2,"data":[1,2,3]}"#;
        assert!(serde_json::from_str::<SampleMatrix>(short).is_err());

        let blob = bincode::serialize(&(3_usize, 2_usize, vec![0.0_f64; 5])).unwrap();
        assert!(bincode::deserialize::<SampleMatrix>(&blob).is_err());
    }

    #[test]
    fn test_map() {
        let matrix = SampleMatrix::from_vector(vec![0.0, 1.0]).map(f64::exp);
        assert_eq!(matrix.values(), &[1.0, std::f64::consts::E]);
        assert_eq!(matrix.grand_mean(), (1.0 + std::f64::consts::E) / 2.0);
    }
}
