//! Ordered candidate probing.
//!
//! Both the installer jar and the reference mod directories can live in more
//! than one place. Candidates are walked in order and the first one that
//! exists wins. A candidate that exists but cannot be read stops the walk
//! with [`LauncherError::CandidateUnreadable`] rather than silently falling
//! through to a later, possibly stale, location.

use crate::error::{LauncherError, LauncherResult};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io::ErrorKind;

/// What kind of filesystem entry a candidate must be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    File,
    Directory,
}

/// Return the first candidate that exists as `kind` and is readable.
///
/// Candidates that are missing, or exist as the other kind, are skipped.
pub fn probe_first(
    candidates: &[Utf8PathBuf],
    kind: CandidateKind,
) -> LauncherResult<Option<Utf8PathBuf>> {
    for candidate in candidates {
        let metadata = match fs::metadata(candidate) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::trace!("Candidate {} does not exist", candidate);
                continue;
            }
            Err(source) => {
                return Err(LauncherError::CandidateUnreadable {
                    path: candidate.clone(),
                    source,
                });
            }
        };

        let matches_kind = match kind {
            CandidateKind::File => metadata.is_file(),
            CandidateKind::Directory => metadata.is_dir(),
        };
        if !matches_kind {
            tracing::debug!("Candidate {} is not a {:?}, skipping", candidate, kind);
            continue;
        }

        check_readable(candidate, kind)?;
        tracing::debug!("Selected candidate {}", candidate);
        return Ok(Some(candidate.clone()));
    }

    Ok(None)
}

/// [`probe_first`] on the blocking pool, for use inside async pipeline steps.
pub async fn probe_first_async(
    candidates: Vec<Utf8PathBuf>,
    kind: CandidateKind,
) -> LauncherResult<Option<Utf8PathBuf>> {
    let context = candidates.first().cloned().unwrap_or_default();
    tokio::task::spawn_blocking(move || probe_first(&candidates, kind))
        .await
        .map_err(|e| LauncherError::io(context, std::io::Error::other(e)))?
}

fn check_readable(path: &Utf8Path, kind: CandidateKind) -> LauncherResult<()> {
    let result = match kind {
        CandidateKind::File => fs::File::open(path).map(|_| ()),
        CandidateKind::Directory => fs::read_dir(path).map(|_| ()),
    };

    result.map_err(|source| LauncherError::CandidateUnreadable {
        path: path.to_path_buf(),
        source,
    })
}
