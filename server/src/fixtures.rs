use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::Value;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

const FIXTURE_PREFIX: &str = "response";
const FIXTURE_SUFFIX: &str = ".json";

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("no response files found in {}", dir.display())]
    NoFixtures { dir: PathBuf },

    #[error("failed to list {}", dir.display())]
    ListDir {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A fixture picked for one request, with the question already injected
#[derive(Debug, Clone)]
pub struct Answer {
    /// File name of the chosen fixture
    pub fixture: String,

    pub document: Value,

    /// Whether the document had a `modelResult` object to patch
    pub injected: bool,
}

/// Read-only view over the fixtures directory.
///
/// The directory is listed again on every call so fixtures can be added or
/// removed while the server runs. Nothing is cached and nothing is written.
#[derive(Debug, Clone)]
pub struct FixtureStore {
    dir: PathBuf,
}

impl FixtureStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// List the current fixture set, sorted by path.
    ///
    /// Only regular files (symlinks are followed) directly inside the
    /// directory whose name matches `response*.json` are included. A missing
    /// directory is an empty set.
    pub async fn list(&self) -> Result<Vec<PathBuf>, FixtureError> {
        let mut entries = match fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(FixtureError::ListDir {
                    dir: self.dir.clone(),
                    source,
                })
            }
        };

        let mut files = Vec::new();
        loop {
            let entry = match entries.next_entry().await {
                Ok(Some(entry)) => entry,
                Ok(None) => break,
                Err(source) => {
                    return Err(FixtureError::ListDir {
                        dir: self.dir.clone(),
                        source,
                    })
                }
            };

            let name = entry.file_name();
            if !name.to_str().is_some_and(is_fixture_name) {
                continue;
            }

            let path = entry.path();
            // Dangling symlinks and entries removed mid-listing are skipped
            if let Ok(meta) = fs::metadata(&path).await {
                if meta.is_file() {
                    files.push(path);
                }
            }
        }

        files.sort();
        Ok(files)
    }

    /// Pick one fixture uniformly at random
    pub fn choose<'a, R>(files: &'a [PathBuf], rng: &mut R) -> Option<&'a PathBuf>
    where
        R: Rng + ?Sized,
    {
        files.choose(rng)
    }

    /// Read and parse one fixture. The file on disk is never modified.
    pub async fn load(&self, path: &Path) -> Result<Value, FixtureError> {
        let bytes = fs::read(path).await.map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_slice(&bytes).map_err(|source| FixtureError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// List, pick, load and patch a fixture for `question`
    pub async fn answer(&self, question: &str) -> Result<Answer, FixtureError> {
        let files = self.list().await?;

        let path = {
            let mut rng = rand::thread_rng();
            Self::choose(&files, &mut rng).cloned()
        }
        .ok_or_else(|| FixtureError::NoFixtures {
            dir: self.dir.clone(),
        })?;

        tracing::debug!(
            "Fixture set in {} has {} file(s)",
            self.dir().display(),
            files.len()
        );

        let mut document = self.load(&path).await?;
        let injected = inject_question(&mut document, question);

        let fixture = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Answer {
            fixture,
            document,
            injected,
        })
    }
}

fn is_fixture_name(name: &str) -> bool {
    name.starts_with(FIXTURE_PREFIX) && name.ends_with(FIXTURE_SUFFIX)
}

/// Overwrite `modelResult.question` with `question`.
///
/// Returns false and leaves the document untouched when there is no
/// top-level `modelResult` object.
pub fn inject_question(document: &mut Value, question: &str) -> bool {
    match document.get_mut("modelResult") {
        Some(Value::Object(result)) => {
            result.insert("question".to_string(), Value::String(question.to_string()));
            true
        }
        _ => false,
    }
}
