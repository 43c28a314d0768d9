#![warn(clippy::pedantic, rust_2018_idioms)]

mod config;
mod criteria;
mod error;
mod fingerprint;
mod hdi;
mod posterior;
mod profiles;
mod report;
mod samples;
mod scores;
mod special;
mod util;
mod wrangle;

use crate::config::Config;
use crate::posterior::Posterior;
use crate::report::Table;
use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

const USAGE: &str = "\
usage: shotgen-posterior <command> [options]

commands:
  wrangle <shots.csv> [--out <file>]
  summary <draws.csv>...
  profiles --generation <draws.csv>... --conversion <draws.csv>... --shots <shots.csv>
  scores <draws.csv>...

options:
  --json              print JSON instead of a table
  --width <w>         credible interval width, default 0.5
  --force-reload      ignore the posterior cache
  --cache-dir <dir>   posterior cache location (or $SHOTGEN_CACHE_DIR)";

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let mut config = Config::default();
    let mut args = config.take_flags(std::env::args().skip(1).collect())?;
    if args.is_empty() {
        bail!("{}", USAGE);
    }
    let command = args.remove(0);
    match command.as_str() {
        "wrangle" => wrangle(&args),
        "summary" => {
            let posterior = Posterior::load(&paths(&args)?, &config)?;
            let summary = report::summarize(&posterior, config.width)?;
            emit(&config, &summary, &summary)
        }
        "profiles" => profiles(&args, &config),
        "scores" => {
            let posterior = Posterior::load(&paths(&args)?, &config)?;
            let effects = scores::score_effects(posterior.get("score_raw")?)?;
            emit(&config, &effects, &Table(&effects))
        }
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("unknown command {:?}\n\n{}", other, USAGE),
    }
}

fn wrangle(args: &[String]) -> Result<()> {
    let mut input = None;
    let mut out = None;
    let mut args = args.iter();
    while let Some(arg) = args.next() {
        if arg == "--out" {
            out = Some(PathBuf::from(args.next().context("--out needs a value")?));
        } else if let Some(path) = arg.strip_prefix("--out=") {
            out = Some(PathBuf::from(path));
        } else if input.is_none() {
            input = Some(PathBuf::from(arg));
        } else {
            bail!("unexpected argument {:?}", arg);
        }
    }
    let input = input.context("wrangle needs a shots CSV")?;

    let (data, teams) = wrangle::wrangle(&input)?;
    let writer: Box<dyn Write> = match &out {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(io::stdout()),
    };
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, &data)?;
    writeln!(writer)?;
    writer.flush()?;

    if out.is_some() {
        for (idx, team) in teams.labels().iter().enumerate() {
            println!("{:>3} {}", idx + 1, team);
        }
    }
    Ok(())
}

fn profiles(args: &[String], config: &Config) -> Result<()> {
    #[derive(Clone, Copy)]
    enum Slot {
        Generation,
        Conversion,
        Shots,
    }

    let mut generation = Vec::new();
    let mut conversion = Vec::new();
    let mut shots = None;
    let mut slot = None;
    for arg in args {
        match arg.as_str() {
            "--generation" => slot = Some(Slot::Generation),
            "--conversion" => slot = Some(Slot::Conversion),
            "--shots" => slot = Some(Slot::Shots),
            _ => match slot {
                Some(Slot::Generation) => generation.push(PathBuf::from(arg)),
                Some(Slot::Conversion) => conversion.push(PathBuf::from(arg)),
                Some(Slot::Shots) if shots.is_none() => shots = Some(PathBuf::from(arg)),
                _ => bail!("unexpected argument {:?}", arg),
            },
        }
    }
    let shots = shots.context("profiles needs --shots")?;
    if generation.is_empty() || conversion.is_empty() {
        bail!("profiles needs --generation and --conversion draws");
    }

    let (_, teams) = wrangle::wrangle(&shots)?;
    let generation = Posterior::load(&generation, config)?;
    let conversion = Posterior::load(&conversion, config)?;
    let profiles = profiles::team_profiles(&generation, &conversion, &teams.labels(), config.width)?;
    emit(config, &profiles, &Table(&profiles))?;
    if !config.json {
        let average = profiles::league_average(&profiles);
        println!(
            "league average: {:.2} min / {:.3} conv (attack), {:.2} min / {:.3} conv (defence)",
            average.attack.0, average.attack.1, average.defence.0, average.defence.1
        );
    }
    Ok(())
}

fn paths(args: &[String]) -> Result<Vec<&Path>> {
    if args.is_empty() {
        bail!("no posterior files given");
    }
    Ok(args.iter().map(Path::new).collect())
}

fn emit<T: Serialize, D: std::fmt::Display>(config: &Config, value: &T, table: &D) -> Result<()> {
    if config.json {
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        serde_json::to_writer_pretty(&mut writer, value)?;
        writeln!(writer)?;
    } else {
        print!("{}", table);
    }
    Ok(())
}
