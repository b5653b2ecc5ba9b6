//! Snapshot-directory persistence with a staged swap.

use fs2::FileExt;
use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::{RagError, Result};
use crate::types::ChunkMetadata;

use super::{FORMAT_VERSION, Persistence, Snapshot, SnapshotRef};

const CURRENT_DIR: &str = "current";
const STAGING_DIR: &str = ".staging";
const PREVIOUS_DIR: &str = ".previous";
const LOCK_FILE: &str = ".lock";

const INDEX_FILE: &str = "index.bin";
const METADATA_FILE: &str = "metadata.json";
const TEXTS_FILE: &str = "texts.json";

/// Header and vector buffer stored in `index.bin`.
#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
struct IndexFile {
    format_version: u32,
    dimension: u64,
    count: u64,
    vectors: Vec<f32>,
}

/// Persists the store as a directory of three artifacts.
///
/// Layout under the root directory:
///
/// ```text
/// .lock                  advisory lock held while this value lives
/// current/index.bin      rkyv header plus row-major vectors
/// current/metadata.json  chunk metadata in id order
/// current/texts.json     chunk texts in id order
/// ```
///
/// Each save writes a full snapshot into `.staging`, then moves `current` aside to
/// `.previous`, renames `.staging` to `current` and removes `.previous`. Loading falls
/// back to `.previous` when a crash happened between the two renames.
///
/// Opening takes an exclusive OS advisory lock on `.lock`, so only one process can
/// write a given directory. The lock is released when the value is dropped or the
/// process exits.
///
/// # Example
///
/// ```rust,no_run
/// use quarry_rag::persistence::{DirectoryPersistence, Persistence};
///
/// let persistence = DirectoryPersistence::open("./persist")?;
/// let snapshot = persistence.load()?;
/// # Ok::<(), quarry_rag::RagError>(())
/// ```
#[derive(Debug)]
pub struct DirectoryPersistence {
    root: PathBuf,
    _lock: File,
}

impl DirectoryPersistence {
    /// Opens (creating if needed) a persistence directory and locks it.
    ///
    /// # Errors
    /// Returns [`RagError::Locked`] if another handle holds the directory, or
    /// [`RagError::Persistence`] if the directory or lock file cannot be created.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(persistence_error(&root))?;

        let lock_path = root.join(LOCK_FILE);
        let lock = OpenOptions::new()
            .create(true)
            .truncate(false)
            .read(true)
            .write(true)
            .open(&lock_path)
            .map_err(persistence_error(&lock_path))?;

        if let Err(err) = lock.try_lock_exclusive() {
            if err.raw_os_error() == fs2::lock_contended_error().raw_os_error() {
                return Err(RagError::Locked(root));
            }
            return Err(RagError::Persistence {
                path: lock_path,
                source: err,
            });
        }

        debug!(path = %root.display(), "locked persistence directory");
        Ok(Self { root, _lock: lock })
    }

    fn write_snapshot(&self, dir: &Path, snapshot: SnapshotRef<'_>) -> Result<()> {
        let header = IndexFile {
            format_version: FORMAT_VERSION,
            dimension: snapshot.dimension as u64,
            count: snapshot.texts.len() as u64,
            vectors: snapshot.vectors.to_vec(),
        };
        let index_bytes =
            rkyv::to_bytes::<RkyvError>(&header).map_err(|e| RagError::Serialization(e.to_string()))?;
        write_synced(&dir.join(INDEX_FILE), &index_bytes)?;

        let metadata = serde_json::to_vec(snapshot.metadata)
            .map_err(|e| RagError::Serialization(e.to_string()))?;
        write_synced(&dir.join(METADATA_FILE), &metadata)?;

        let texts = serde_json::to_vec(snapshot.texts)
            .map_err(|e| RagError::Serialization(e.to_string()))?;
        write_synced(&dir.join(TEXTS_FILE), &texts)?;

        sync_dir(dir)
    }

    fn read_snapshot(dir: &Path) -> Result<Snapshot> {
        let index_path = dir.join(INDEX_FILE);
        let raw = fs::read(&index_path).map_err(persistence_error(&index_path))?;
        let mut aligned = AlignedVec::<16>::with_capacity(raw.len());
        aligned.extend_from_slice(&raw);
        let header = rkyv::from_bytes::<IndexFile, RkyvError>(&aligned)
            .map_err(|e| RagError::Corrupt(format!("{}: {e}", index_path.display())))?;

        if header.format_version != FORMAT_VERSION {
            return Err(RagError::Corrupt(format!(
                "unsupported index format version {} (expected {FORMAT_VERSION})",
                header.format_version
            )));
        }

        let metadata: Vec<ChunkMetadata> = read_json(&dir.join(METADATA_FILE))?;
        let texts: Vec<String> = read_json(&dir.join(TEXTS_FILE))?;

        if header.count != texts.len() as u64 {
            return Err(RagError::Corrupt(format!(
                "index header records {} vectors but {} texts are stored",
                header.count,
                texts.len()
            )));
        }

        let snapshot = Snapshot {
            dimension: usize::try_from(header.dimension)
                .map_err(|_| RagError::Corrupt("dimension overflows usize".into()))?,
            vectors: header.vectors,
            texts,
            metadata,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }
}

impl Persistence for DirectoryPersistence {
    fn save(&self, snapshot: SnapshotRef<'_>) -> Result<()> {
        let staging = self.root.join(STAGING_DIR);
        let current = self.root.join(CURRENT_DIR);
        let previous = self.root.join(PREVIOUS_DIR);

        remove_dir_if_exists(&staging)?;
        fs::create_dir(&staging).map_err(persistence_error(&staging))?;
        self.write_snapshot(&staging, snapshot)?;
        debug!(path = %staging.display(), count = snapshot.texts.len(), "staged snapshot");

        if current.exists() {
            remove_dir_if_exists(&previous)?;
            fs::rename(&current, &previous).map_err(persistence_error(&current))?;
        }
        fs::rename(&staging, &current).map_err(persistence_error(&staging))?;

        // The snapshot is live from here on; cleanup failures must not fail the save.
        if let Err(err) = remove_dir_if_exists(&previous) {
            warn!(path = %previous.display(), error = %err, "failed to remove previous snapshot");
        }
        if let Err(err) = sync_dir(&self.root) {
            warn!(path = %self.root.display(), error = %err, "failed to sync persistence directory");
        }

        debug!(path = %current.display(), "snapshot committed");
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let current = self.root.join(CURRENT_DIR);
        if current.exists() {
            return Self::read_snapshot(&current).map(Some);
        }

        let previous = self.root.join(PREVIOUS_DIR);
        if previous.exists() {
            warn!(
                path = %previous.display(),
                "no committed snapshot, recovering from previous snapshot"
            );
            let snapshot = Self::read_snapshot(&previous)?;
            fs::rename(&previous, &current).map_err(persistence_error(&previous))?;
            sync_dir(&self.root)?;
            return Ok(Some(snapshot));
        }

        Ok(None)
    }

    fn path(&self) -> &Path {
        &self.root
    }
}

fn persistence_error(path: &Path) -> impl FnOnce(io::Error) -> RagError + '_ {
    move |source| RagError::Persistence {
        path: path.to_path_buf(),
        source,
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file = File::create(path).map_err(persistence_error(path))?;
    file.write_all(bytes).map_err(persistence_error(path))?;
    file.sync_all().map_err(persistence_error(path))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path).map_err(persistence_error(path))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| RagError::Corrupt(format!("{}: {e}", path.display())))
}

fn remove_dir_if_exists(path: &Path) -> Result<()> {
    match fs::remove_dir_all(path) {
        Err(err) if err.kind() != io::ErrorKind::NotFound => Err(RagError::Persistence {
            path: path.to_path_buf(),
            source: err,
        }),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn sync_dir(path: &Path) -> Result<()> {
    File::open(path)
        .and_then(|dir| dir.sync_all())
        .map_err(persistence_error(path))
}

// Directory handles cannot be fsynced on this platform.
#[cfg(not(unix))]
fn sync_dir(_path: &Path) -> Result<()> {
    Ok(())
}
