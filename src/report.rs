use crate::criteria::{aic, waic_terms, WaicTerms};
use crate::hdi::{hdi, CredibleInterval};
use crate::posterior::Posterior;
use crate::profiles::TeamProfile;
use crate::scores::ScoreEffect;
use crate::util::mean;
use anyhow::Result;
use serde::Serialize;
use std::fmt;
use tracing::{debug, instrument};

pub const LOG_LIK: &str = "logLik";
pub const N_PARAMS: &str = "n_params";

#[derive(Debug, Serialize)]
pub struct FitSummary {
    pub draws: usize,
    pub width: f64,
    pub aic: Option<f64>,
    pub waic: Option<Waic>,
    pub variables: Vec<VariableSummary>,
}

#[derive(Debug, Serialize)]
pub struct Waic {
    pub waic: f64,
    #[serde(flatten)]
    pub terms: WaicTerms,
}

#[derive(Debug, Serialize)]
pub struct VariableSummary {
    pub name: String,
    /// 1-based, matching the sampler's own column names. `None` for scalars.
    pub index: Option<usize>,
    pub mean: f64,
    pub interval: CredibleInterval,
}

/// Column means and intervals for every model variable, plus information criteria when the fit
/// recorded a log-likelihood. Sampler diagnostics (`lp__`, `accept_stat__`, ...) and the
/// log-likelihood itself are left out of the variable list.
#[instrument(skip(posterior))]
pub fn summarize(posterior: &Posterior, width: f64) -> Result<FitSummary> {
    let mut summary = FitSummary {
        draws: posterior.n_draws(),
        width,
        aic: None,
        waic: None,
        variables: Vec::new(),
    };

    if posterior.contains(LOG_LIK) {
        let log_lik = posterior.get(LOG_LIK)?;
        let terms = waic_terms(log_lik)?;
        summary.waic = Some(Waic {
            waic: terms.waic(),
            terms,
        });
        if posterior.contains(N_PARAMS) {
            summary.aic = Some(aic(log_lik, posterior.vector(N_PARAMS)?)?);
        } else {
            debug!("no {} in posterior, skipping AIC", N_PARAMS);
        }
    }

    for (name, matrix) in posterior.variables() {
        if name == LOG_LIK || name.ends_with("__") {
            continue;
        }
        for unit in 0..matrix.n_units() {
            let draws: Vec<f64> = matrix.column(unit).collect();
            summary.variables.push(VariableSummary {
                name: name.to_owned(),
                index: if matrix.n_units() == 1 {
                    None
                } else {
                    Some(unit + 1)
                },
                mean: mean(draws.iter().copied()),
                interval: hdi(&draws, width)?,
            });
        }
    }
    Ok(summary)
}

impl fmt::Display for FitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "draws: {}", self.draws)?;
        if let Some(aic) = self.aic {
            writeln!(f, "AIC: {:.2}", aic)?;
        }
        if let Some(waic) = &self.waic {
            writeln!(
                f,
                "WAIC: {:.2} (lppd: {:.2}, pWAIC: {:.2})",
                waic.waic, waic.terms.lppd, waic.terms.p_waic
            )?;
        }
        writeln!(
            f,
            "{:<24} {:>10} {:>10} {:>10}",
            "variable",
            "mean",
            format!("{:.0}% lo", self.width * 100.0),
            "hi"
        )?;
        for v in &self.variables {
            let name = match v.index {
                Some(i) => format!("{}[{}]", v.name, i),
                None => v.name.clone(),
            };
            writeln!(
                f,
                "{:<24} {:>10.4} {:>10.4} {:>10.4}",
                name, v.mean, v.interval.lower, v.interval.upper
            )?;
        }
        Ok(())
    }
}

// =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=   =^..^=

/// Plain-text rendering of a slice of rows.
pub struct Table<'a, T>(pub &'a [T]);

impl fmt::Display for Table<'_, TeamProfile> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<24} {:>22} {:>10} {:>22} {:>10}",
            "team", "minutes to shot", "conv", "minutes to concede", "conv"
        )?;
        for row in self.0 {
            let attack = &row.profile.attack;
            let defence = &row.profile.defence;
            writeln!(
                f,
                "{:<24} {:>7.2} ({:>5.2}-{:>5.2}) {:>10.3} {:>7.2} ({:>5.2}-{:>5.2}) {:>10.3}",
                row.team,
                attack.minutes,
                attack.minutes_interval.lower,
                attack.minutes_interval.upper,
                attack.conversion,
                defence.minutes,
                defence.minutes_interval.lower,
                defence.minutes_interval.upper,
                defence.conversion,
            )?;
        }
        Ok(())
    }
}

impl fmt::Display for Table<'_, ScoreEffect> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<8} {:>10} {:>10} {:>10}",
            "score", "rate", "-95%", "+95%"
        )?;
        for row in self.0 {
            writeln!(
                f,
                "{:<8} {:>10.3} {:>10.3} {:>10.3}",
                row.score, row.mean, row.below, row.above
            )?;
        }
        Ok(())
    }
}
