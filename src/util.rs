use serde::Serialize;

#[allow(clippy::cast_precision_loss)]
pub fn mean<I: IntoIterator<Item = f64>>(xs: I) -> f64 {
    let mut len = 0_usize;
    let mut sum = 0.0;
    for x in xs {
        len += 1;
        sum += x;
    }
    sum / len as f64
}

/// Population variance (divides by `n`, not `n - 1`).
#[allow(clippy::cast_precision_loss)]
pub fn variance(xs: &[f64]) -> f64 {
    let m = mean(xs.iter().copied());
    xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64
}

/// `ln(mean(exp(xs)))`, shifted by the maximum so large-magnitude inputs neither underflow nor
/// overflow.
#[allow(clippy::cast_precision_loss)]
pub fn log_mean_exp(xs: &[f64]) -> f64 {
    let max = xs.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_infinite() {
        return max;
    }
    let sum: f64 = xs.iter().map(|x| (x - max).exp()).sum();
    max + (sum / xs.len() as f64).ln()
}


// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize)]
pub struct AttackDefence<T> {
    pub attack: T,
    pub defence: T,
}

impl<T> AttackDefence<T> {
    pub fn map<F, U>(&self, f: F) -> AttackDefence<U>
    where
        F: Fn(&T) -> U,
    {
        AttackDefence {
            attack: f(&self.attack),
            defence: f(&self.defence),
        }
    }
}
