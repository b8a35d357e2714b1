use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems reading the validator inputs. Any of these aborts the run
/// before a single check executes.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed state document {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed level definition {}: {source}", path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl LoadError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True for malformed content, false for unreadable files.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Json { .. } | Self::Yaml { .. })
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. } | Self::Json { path, .. } | Self::Yaml { path, .. } => path,
        }
    }
}
