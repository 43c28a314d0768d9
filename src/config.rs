use crate::hdi::DEFAULT_WIDTH;
use anyhow::{bail, Context, Result};
use std::path::PathBuf;

pub const CACHE_DIR_VAR: &str = "SHOTGEN_CACHE_DIR";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cache_dir: Option<PathBuf>,
    pub force_reload: bool,
    pub json: bool,
    pub width: f64,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            cache_dir: std::env::var_os(CACHE_DIR_VAR).map(PathBuf::from),
            force_reload: false,
            json: false,
            width: DEFAULT_WIDTH,
        }
    }
}

impl Config {
    /// Where parsed posteriors are cached: `$SHOTGEN_CACHE_DIR`, else the user cache dir.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(dirs::cache_dir()
                .context("unable to find cache dir")?
                .join(env!("CARGO_PKG_NAME"))),
        }
    }

    /// Pulls the flags shared by every subcommand out of `args`, returning what's left.
    pub fn take_flags(&mut self, args: Vec<String>) -> Result<Vec<String>> {
        let mut rest = Vec::new();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            if arg == "--json" {
                self.json = true;
            } else if arg == "--force-reload" {
                self.force_reload = true;
            } else if let Some(dir) = arg.strip_prefix("--cache-dir=") {
                self.cache_dir = Some(PathBuf::from(dir));
            } else if arg == "--cache-dir" {
                let dir = args.next().context("--cache-dir needs a value")?;
                self.cache_dir = Some(PathBuf::from(dir));
            } else if let Some(width) = arg.strip_prefix("--width=") {
                self.width = parse_width(width)?;
            } else if arg == "--width" {
                let width = args.next().context("--width needs a value")?;
                self.width = parse_width(&width)?;
            } else {
                rest.push(arg);
            }
        }
        Ok(rest)
    }
}

fn parse_width(raw: &str) -> Result<f64> {
    let width: f64 = raw
        .trim()
        .parse()
        .with_context(|| format!("invalid width {:?}", raw))?;
    if !(width > 0.0 && width <= 1.0) {
        bail!("width must be in (0, 1], got {}", width);
    }
    Ok(width)
}
