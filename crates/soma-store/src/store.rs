use crate::recording::Recording;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Decoded recordings kept alive across requests.
const DECODE_CACHE_CAPACITY: NonZeroUsize = match NonZeroUsize::new(16) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no recording for subject {subject}")]
    SourceUnavailable { subject: String },
    #[error("unknown channel {sensor}/{modality}")]
    MissingChannel { sensor: String, modality: String },
    #[error("malformed recording {path}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// On-disk recordings, one directory per subject, decoded through a bounded
/// least-recently-used cache keyed by file path. Lookups are safe from
/// concurrent requests; decoded recordings are shared read-only.
pub struct RecordingStore {
    root: PathBuf,
    cache: Mutex<LruCache<PathBuf, Arc<Recording>>>,
}

impl RecordingStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self::with_capacity(root, DECODE_CACHE_CAPACITY)
    }

    pub fn with_capacity(root: impl Into<PathBuf>, capacity: NonZeroUsize) -> Self {
        Self {
            root: root.into(),
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/<subject>/<subject>.json`
    pub fn recording_path(&self, subject: &str) -> PathBuf {
        self.root.join(subject).join(format!("{subject}.json"))
    }

    pub fn questionnaire_path(&self, subject: &str) -> PathBuf {
        self.root
            .join(subject)
            .join(format!("{subject}_quest.csv"))
    }

    pub fn readme_path(&self, subject: &str) -> PathBuf {
        self.root
            .join(subject)
            .join(format!("{subject}_readme.txt"))
    }

    pub fn get(&self, subject: &str) -> Result<Arc<Recording>, StoreError> {
        let path = self.recording_path(subject);
        if let Some(hit) = self.lock_cache().get(&path) {
            log::debug!("decode cache hit for {}", path.display());
            return Ok(hit.clone());
        }
        let text = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                StoreError::SourceUnavailable {
                    subject: subject.to_string(),
                }
            } else {
                StoreError::Io {
                    path: path.clone(),
                    source,
                }
            }
        })?;
        let recording: Recording = serde_json::from_str(&text).map_err(|source| {
            StoreError::Malformed {
                path: path.clone(),
                source,
            }
        })?;
        log::debug!(
            "decoded {} ({} sensors, {} label samples)",
            path.display(),
            recording.signal.len(),
            recording.label.len()
        );
        let recording = Arc::new(recording);
        self.lock_cache().put(path, recording.clone());
        Ok(recording)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, LruCache<PathBuf, Arc<Recording>>> {
        self.cache.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
