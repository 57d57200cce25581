//! Image selection
//!
//! When no image is named, the image directory is scanned for files of
//! exactly the flash size. A single match is used as is; several matches are
//! offered to a [`Chooser`], newest first.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::error::{Error, Result};

/// An image file that could be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Path of the image
    pub path: PathBuf,
    /// Creation time (modification time where creation is not recorded)
    pub created: SystemTime,
}

/// Picks one of several candidates
///
/// Candidates are ordered newest first. Returning `None` cancels the
/// selection.
pub trait Chooser {
    /// Index of the chosen candidate
    fn choose(&mut self, candidates: &[Candidate]) -> Option<usize>;
}

impl<F> Chooser for F
where
    F: FnMut(&[Candidate]) -> Option<usize>,
{
    fn choose(&mut self, candidates: &[Candidate]) -> Option<usize> {
        self(candidates)
    }
}

/// Order candidates newest first
pub fn sort_newest_first(candidates: &mut [Candidate]) {
    candidates.sort_by(|a, b| b.created.cmp(&a.created).then_with(|| a.path.cmp(&b.path)));
}

/// Find the files in `dir` that are exactly `size` bytes long, newest first
pub fn find_candidates(dir: &Path, size: u64) -> Result<Vec<Candidate>> {
    let entries = fs::read_dir(dir).map_err(|e| {
        Error::UnknownImage(format!(
            "cannot read image directory {}: {}",
            dir.display(),
            e
        ))
    })?;

    let mut candidates = Vec::new();
    for entry in entries {
        let entry = entry?;
        let meta = match entry.metadata() {
            Ok(meta) => meta,
            Err(e) => {
                log::debug!("Skipping {}: {}", entry.path().display(), e);
                continue;
            }
        };
        if !meta.is_file() || meta.len() != size {
            continue;
        }

        let created = meta
            .created()
            .or_else(|_| meta.modified())
            .unwrap_or(SystemTime::UNIX_EPOCH);
        candidates.push(Candidate {
            path: entry.path(),
            created,
        });
    }

    sort_newest_first(&mut candidates);
    log::debug!(
        "Found {} image(s) of {} bytes in {}",
        candidates.len(),
        size,
        dir.display()
    );
    Ok(candidates)
}

/// Pick one candidate
///
/// Fails with [`Error::UnknownImage`] when there are none. Returns `None` if
/// the chooser cancels or answers with an index out of range.
pub fn pick<'a>(
    candidates: &'a [Candidate],
    chooser: &mut dyn Chooser,
) -> Result<Option<&'a Candidate>> {
    match candidates {
        [] => Err(Error::UnknownImage(
            "no binary image file of the expected size found".into(),
        )),
        [only] => Ok(Some(only)),
        _ => Ok(chooser.choose(candidates).and_then(|i| candidates.get(i))),
    }
}

/// Resolve the image to write
///
/// An explicit path is returned unchecked; otherwise `dir` is scanned for
/// images of `size` bytes.
pub fn select_image(
    explicit: Option<&Path>,
    dir: &Path,
    size: u64,
    chooser: &mut dyn Chooser,
) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        return Ok(Some(path.to_path_buf()));
    }

    let candidates = find_candidates(dir, size)?;
    Ok(pick(&candidates, chooser)?.map(|c| c.path.clone()))
}

/// Parse a 1-based menu answer into an index
///
/// Anything that is not a number from 1 to `count` (such as `q`) yields
/// `None`.
pub fn parse_choice(input: &str, count: usize) -> Option<usize> {
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=count).contains(&n) => Some(n - 1),
        _ => None,
    }
}
