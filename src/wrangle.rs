use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, instrument, warn};

/// One row of the shots CSV. Columns not named here are ignored.
#[derive(Debug, Deserialize)]
struct Shot {
    team: String,
    oppo: String,
    wait: f64,
    time: f64,
    home: u8,
    neutral: u8,
    shot: u8,
    goal: u8,
    own_goal: u8,
    penalty: u8,
    state: i32,
}

/// Sampler input, one vector per column.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct StanData {
    pub team: Vec<usize>,
    pub oppo: Vec<usize>,
    pub wait: Vec<f64>,
    pub time: Vec<f64>,
    pub home: Vec<u8>,
    pub neutral: Vec<u8>,
    pub shot: Vec<u8>,
    pub goal: Vec<u8>,
    pub own_goal: Vec<u8>,
    pub penalty: Vec<u8>,
    pub state: Vec<i32>,
    pub n_teams: usize,
    pub n_shots: usize,
}

/// Team name to 1-based index, assigned in name order.
#[derive(Debug, Default, PartialEq, Serialize)]
pub struct TeamMap(BTreeMap<String, usize>);

impl TeamMap {
    pub fn new<'a, I: IntoIterator<Item = &'a str>>(names: I) -> TeamMap {
        let names: BTreeSet<&str> = names.into_iter().collect();
        TeamMap(
            names
                .into_iter()
                .enumerate()
                .map(|(idx, name)| (name.to_owned(), idx + 1))
                .collect(),
        )
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Team names in index order.
    pub fn labels(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }
}

#[instrument]
pub fn wrangle(path: &Path) -> Result<(StanData, TeamMap)> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    wrangle_reader(file).with_context(|| format!("wrangling {}", path.display()))
}

pub fn wrangle_reader<R: Read>(reader: R) -> Result<(StanData, TeamMap)> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let shots = reader
        .deserialize()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("shot {}", i)))
        .collect::<Result<Vec<Shot>>>()?;
    let team_map = TeamMap::new(
        shots
            .iter()
            .flat_map(|shot| vec![shot.team.as_str(), shot.oppo.as_str()]),
    );
    if team_map.is_empty() {
        warn!("no shots found");
    }

    let mut data = StanData {
        n_teams: team_map.len(),
        n_shots: shots.len(),
        ..StanData::default()
    };
    for shot in shots {
        // every name is in the map, it was built from these rows
        data.team.extend(team_map.get(&shot.team));
        data.oppo.extend(team_map.get(&shot.oppo));
        data.wait.push(shot.wait);
        data.time.push(shot.time);
        data.home.push(shot.home);
        data.neutral.push(shot.neutral);
        data.shot.push(shot.shot);
        data.goal.push(shot.goal);
        data.own_goal.push(shot.own_goal);
        data.penalty.push(shot.penalty);
        data.state.push(shot.state);
    }
    info!(teams = data.n_teams, shots = data.n_shots, "wrangled shots");
    Ok((data, team_map))
}
