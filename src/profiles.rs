//! Per-team attack and defence profiles from the shot generation and conversion fits.
//!
//! Generation is a Weibull waiting-time model: a team's coefficient scales the expected time to
//! the next shot. Conversion is logistic. Both are read "at 0:0 against average opposition".

use crate::error::SummaryError;
use crate::hdi::{hdi, CredibleInterval};
use crate::posterior::Posterior;
use crate::samples::SampleMatrix;
use crate::special::{expit, weibull_mean};
use crate::util::{mean, AttackDefence};
use anyhow::Result;
use rayon::prelude::*;
use serde::Serialize;
use tracing::instrument;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    /// Expected minutes to the next shot (taken for attack, conceded for defence).
    pub minutes: f64,
    pub minutes_interval: CredibleInterval,
    /// Expected probability that a shot is converted.
    pub conversion: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamProfile {
    pub team: String,
    #[serde(flatten)]
    pub profile: AttackDefence<Profile>,
}

#[instrument(skip_all, fields(teams = labels.len()))]
pub fn team_profiles(
    generation_fit: &Posterior,
    conversion_fit: &Posterior,
    labels: &[String],
    width: f64,
) -> Result<Vec<TeamProfile>> {
    let generation = generation_fit.get("generation")?;
    let prevention = generation_fit.get("prevention")?;
    let conversion = conversion_fit.get("conversion")?;
    let obstruction = conversion_fit.get("obstruction")?;
    for matrix in &[generation, prevention, conversion, obstruction] {
        if matrix.n_units() != labels.len() {
            return Err(SummaryError::shape(
                format!("{} teams", labels.len()),
                format!("{} columns", matrix.n_units()),
            )
            .into());
        }
    }
    let shape = mean(generation_fit.vector("k")?.iter().copied());

    let generation_mean = generation.grand_mean();
    let conversion_mean = conversion.grand_mean();
    let minutes = AttackDefence {
        attack: generation.map(|g| weibull_mean(shape, (-g).exp())),
        defence: prevention.map(|p| weibull_mean(shape, (-(p + generation_mean)).exp())),
    };
    let converted = AttackDefence {
        attack: conversion.map(expit),
        defence: obstruction.map(|o| expit(o + conversion_mean)),
    };

    labels
        .par_iter()
        .enumerate()
        .map(|(team, label)| -> Result<TeamProfile> {
            Ok(TeamProfile {
                team: label.clone(),
                profile: AttackDefence {
                    attack: profile(&minutes.attack, &converted.attack, team, width)?,
                    defence: profile(&minutes.defence, &converted.defence, team, width)?,
                },
            })
        })
        .collect()
}

fn profile(
    minutes: &SampleMatrix,
    conversion: &SampleMatrix,
    team: usize,
    width: f64,
) -> Result<Profile, SummaryError> {
    let draws: Vec<f64> = minutes.column(team).collect();
    Ok(Profile {
        minutes: mean(draws.iter().copied()),
        minutes_interval: hdi(&draws, width)?,
        conversion: mean(conversion.column(team)),
    })
}

/// Mean (minutes, conversion) across teams, for attack and defence.
pub fn league_average(profiles: &[TeamProfile]) -> AttackDefence<(f64, f64)> {
    let sides = AttackDefence {
        attack: profiles.iter().map(|p| &p.profile.attack).collect::<Vec<_>>(),
        defence: profiles.iter().map(|p| &p.profile.defence).collect::<Vec<_>>(),
    };
    sides.map(|side| {
        (
            mean(side.iter().map(|p| p.minutes)),
            mean(side.iter().map(|p| p.conversion)),
        )
    })
}
