use crate::error::{LauncherError, LauncherResult};
use crate::models::Profile;
use crate::services::probe::{CandidateKind, probe_first_async};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

const MODS_DIR_NAME: &str = "mods";

/// Result of a [`AssetSynchronizer::sync_assets`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetSyncOutcome {
    /// Files were mirrored from `source` into the game directory.
    Copied { source: Utf8PathBuf, files: usize },
    /// No reference mod set exists for the profile; nothing was touched.
    SourceMissing { searched: Vec<Utf8PathBuf> },
}

/// Mirrors a profile's reference mod set into `<target>/mods`.
///
/// The copy is additive: files with the same relative path are overwritten,
/// files that only exist in the destination are left alone. A failing copy
/// aborts the walk and may leave a partial mirror behind.
pub struct AssetSynchronizer {
    candidate_roots: Box<dyn Fn(&str) -> Vec<Utf8PathBuf> + Send + Sync>,
}

impl AssetSynchronizer {
    /// # Arguments
    /// * `candidate_roots` - Maps a mod directory name (`mods-<version>`) to the
    ///   locations it may live in, most preferred first
    pub fn new<F>(candidate_roots: F) -> Self
    where
        F: Fn(&str) -> Vec<Utf8PathBuf> + Send + Sync + 'static,
    {
        Self {
            candidate_roots: Box::new(candidate_roots),
        }
    }

    pub fn destination(target_dir: &Utf8Path) -> Utf8PathBuf {
        target_dir.join(MODS_DIR_NAME)
    }

    async fn locate_source(&self, profile: &Profile) -> LauncherResult<Utf8PathBuf> {
        let searched = (self.candidate_roots)(&profile.asset_dir_name());
        probe_first_async(searched.clone(), CandidateKind::Directory)
            .await?
            .ok_or_else(|| LauncherError::AssetSourceMissing {
                profile: profile.id.clone(),
                searched,
            })
    }

    /// Mirror the reference mods for `profile` into `target_dir`.
    ///
    /// A missing source is not an error: it is logged and reported as
    /// [`AssetSyncOutcome::SourceMissing`].
    pub async fn sync_assets(
        &self,
        target_dir: &Utf8Path,
        profile: &Profile,
    ) -> LauncherResult<AssetSyncOutcome> {
        let source = match self.locate_source(profile).await {
            Ok(source) => source,
            Err(LauncherError::AssetSourceMissing { searched, .. }) => {
                tracing::warn!(
                    "Mod set {} not found for profile {}, skipping sync",
                    profile.asset_dir_name(),
                    profile.id
                );
                return Ok(AssetSyncOutcome::SourceMissing { searched });
            }
            Err(e) => return Err(e),
        };

        let destination = Self::destination(target_dir);
        tracing::info!("Syncing mods ({}) from {} to {}", profile.id, source, destination);

        let copy_source = source.clone();
        let files = tokio::task::spawn_blocking(move || copy_tree(&copy_source, &destination))
            .await
            .map_err(|e| LauncherError::AssetCopyFailed {
                path: source.clone(),
                source: std::io::Error::other(e),
            })??;

        tracing::info!("Copied {} mod files", files);
        Ok(AssetSyncOutcome::Copied { source, files })
    }
}

/// Copy every regular file under `source` into `destination`, keeping
/// relative paths. Returns the number of files copied.
pub fn copy_tree(source: &Utf8Path, destination: &Utf8Path) -> LauncherResult<usize> {
    fs::create_dir_all(destination).map_err(|e| LauncherError::AssetCopyFailed {
        path: destination.to_path_buf(),
        source: e,
    })?;

    let mut copied = 0;
    for entry in WalkDir::new(source).min_depth(1).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .and_then(Utf8Path::from_path)
                .map(Utf8Path::to_path_buf)
                .unwrap_or_else(|| source.to_path_buf());
            LauncherError::AssetCopyFailed {
                path,
                source: e.into(),
            }
        })?;

        let src_path = Utf8Path::from_path(entry.path()).ok_or_else(|| {
            LauncherError::AssetCopyFailed {
                path: source.to_path_buf(),
                source: std::io::Error::other(format!(
                    "non UTF-8 path: {}",
                    entry.path().display()
                )),
            }
        })?;
        let relative = src_path
            .strip_prefix(source)
            .map_err(|e| LauncherError::AssetCopyFailed {
                path: src_path.to_path_buf(),
                source: std::io::Error::other(e),
            })?;
        let dst_path = destination.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&dst_path).map_err(|e| LauncherError::AssetCopyFailed {
                path: dst_path.clone(),
                source: e,
            })?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent).map_err(|e| LauncherError::AssetCopyFailed {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
            fs::copy(src_path, &dst_path).map_err(|e| LauncherError::AssetCopyFailed {
                path: dst_path.clone(),
                source: e,
            })?;
            tracing::trace!("Copied {}", relative);
            copied += 1;
        }
    }

    Ok(copied)
}
