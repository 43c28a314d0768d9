use std::io::Result;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

pub type Fingerprints = Vec<Fingerprint>;

/// Enough about an input file to notice when it changes.
#[derive(Debug, Hash, PartialEq, Eq)]
pub struct Fingerprint {
    pub path: PathBuf,
    pub len: u64,
    pub modified: SystemTime,
}

pub fn fingerprint(path: &Path) -> Result<Fingerprint> {
    let metadata = std::fs::metadata(path)?;
    Ok(Fingerprint {
        path: path.canonicalize()?,
        len: metadata.len(),
        modified: metadata.modified()?,
    })
}

/// Fingerprints in the order given; chain order matters to the draws, so it matters to the key.
pub fn fingerprint_all<P: AsRef<Path>>(paths: &[P]) -> Result<Fingerprints> {
    paths.iter().map(|p| fingerprint(p.as_ref())).collect()
}
