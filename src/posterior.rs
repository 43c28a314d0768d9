use crate::config::Config;
use crate::fingerprint::{fingerprint_all, Fingerprints};
use crate::samples::SampleMatrix;
use anyhow::{bail, Context, Result};
use flate2::{read::GzDecoder, write::GzEncoder, Compression};
use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::hash::{Hash, Hasher};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument, warn};

const CACHE_VERSION: u64 = 1;

/// Posterior draws from one or more sampler output files, by variable name.
#[derive(Debug, Deserialize, Serialize)]
pub struct Posterior {
    n_draws: usize,
    variables: BTreeMap<String, SampleMatrix>,
}

#[derive(Debug, Hash)]
struct CacheKey<'a> {
    version: u64,
    files: &'a Fingerprints,
}

impl Posterior {
    #[instrument(name = "Posterior::load", skip(config))]
    pub fn load<P: AsRef<Path> + std::fmt::Debug>(paths: &[P], config: &Config) -> Result<Self> {
        if paths.is_empty() {
            bail!("no posterior files given");
        }
        let files = fingerprint_all(paths).context("reading posterior file metadata")?;
        let cache_path = get_cache_path(&files, config.cache_dir());
        if let (Some(cache_path), false) = (&cache_path, config.force_reload) {
            match Posterior::load_from_cache(cache_path) {
                Ok(cache) => {
                    debug!(path = %cache_path.display(), "loaded posterior from cache");
                    return Ok(cache);
                }
                Err(err) => debug!(%err, "posterior cache miss"),
            }
        }

        let mut readers = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            readers.push((
                path.display().to_string(),
                File::open(path).with_context(|| format!("opening {}", path.display()))?,
            ));
        }
        let posterior = Posterior::from_readers(readers)?;
        info!(
            draws = posterior.n_draws,
            variables = posterior.variables.len(),
            "parsed posterior"
        );

        if let Some(cache_path) = &cache_path {
            if let Err(err) = posterior.save_to_cache(cache_path) {
                warn!(%err, "unable to write posterior cache");
            }
        }
        Ok(posterior)
    }

    /// Parses sampler CSV output, one reader per chain. Lines starting with `#` are skipped. Every
    /// chain must have the same header; draws are concatenated in the order given.
    pub fn from_readers<R: Read>(readers: Vec<(String, R)>) -> Result<Self> {
        let mut header: Option<Vec<String>> = None;
        let mut layout = Vec::new();
        let mut columns: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        let mut n_draws = 0;

        for (name, reader) in readers {
            let mut reader = csv::ReaderBuilder::new()
                .comment(Some(b'#'))
                .trim(csv::Trim::All)
                .from_reader(reader);
            let this_header: Vec<String> = reader
                .headers()
                .with_context(|| format!("reading header of {}", name))?
                .iter()
                .map(str::to_owned)
                .collect();
            if header.is_none() {
                layout = this_header.iter().map(|h| base_name(h).to_owned()).collect();
                header = Some(this_header);
            } else if header.as_ref() != Some(&this_header) {
                bail!("{} has a different header from the first chain", name);
            }

            for (i, record) in reader.records().enumerate() {
                let record = record.with_context(|| format!("{}: draw {}", name, i))?;
                for (field, variable) in record.iter().zip(&layout) {
                    let value: f64 = field.parse().with_context(|| {
                        format!("{}: draw {}: {:?} is not a number", name, i, field)
                    })?;
                    columns.entry(variable.clone()).or_default().push(value);
                }
                n_draws += 1;
            }
        }

        if n_draws == 0 {
            bail!("no draws found");
        }
        let mut variables = BTreeMap::new();
        for (variable, data) in columns {
            let n_units = data.len() / n_draws;
            variables.insert(variable, SampleMatrix::new(n_draws, n_units, data)?);
        }
        Ok(Posterior { n_draws, variables })
    }

    pub fn from_variables(variables: BTreeMap<String, SampleMatrix>) -> Result<Self> {
        let n_draws = variables.values().next().map_or(0, SampleMatrix::n_draws);
        for (name, matrix) in &variables {
            if matrix.n_draws() != n_draws {
                bail!(
                    "{} has {} draws, expected {}",
                    name,
                    matrix.n_draws(),
                    n_draws
                );
            }
        }
        Ok(Posterior { n_draws, variables })
    }

    pub fn n_draws(&self) -> usize {
        self.n_draws
    }

    pub fn variables(&self) -> impl Iterator<Item = (&str, &SampleMatrix)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Result<&SampleMatrix> {
        self.variables
            .get(name)
            .with_context(|| format!("posterior has no variable {:?}", name))
    }

    /// Draws of a scalar variable.
    pub fn vector(&self, name: &str) -> Result<&[f64]> {
        let matrix = self.get(name)?;
        if matrix.n_units() != 1 {
            bail!("{} has {} columns, expected a scalar", name, matrix.n_units());
        }
        Ok(matrix.values())
    }

    fn load_from_cache(path: &Path) -> Result<Self> {
        Posterior::decode(File::open(path)?)
    }

    fn save_to_cache(&self, path: &Path) -> Result<()> {
        let data = self.encode()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, data)?;
        Ok(())
    }

    fn encode(&self) -> Result<Vec<u8>> {
        let mut writer = GzEncoder::new(Vec::new(), Compression::default());
        bincode::serialize_into(&mut writer, self)?;
        Ok(writer.finish()?)
    }

    fn decode<R: Read>(reader: R) -> Result<Self> {
        let mut reader = GzDecoder::new(reader);
        Ok(bincode::deserialize_from(&mut reader)?)
    }
}

/// `generation.3` and `generation[3]` both belong to `generation`.
fn base_name(column: &str) -> &str {
    column
        .find(|c| c == '.' || c == '[')
        .map_or(column, |i| &column[..i])
}

/// `None` when there is nowhere to cache; the posterior is then parsed every time.
fn get_cache_path(files: &Fingerprints, cache_dir: Result<PathBuf>) -> Option<PathBuf> {
    let cache_dir = match cache_dir {
        Ok(dir) => dir,
        Err(err) => {
            warn!(%err, "posterior cache disabled");
            return None;
        }
    };
    let mut hasher = FxHasher::default();
    let key = CacheKey {
        version: CACHE_VERSION,
        files,
    };
    key.hash(&mut hasher);
    Some(cache_dir.join(format!("posterior-{:x}.bincode.gz", hasher.finish())))
}
