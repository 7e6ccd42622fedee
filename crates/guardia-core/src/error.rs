use thiserror::Error;

/// Failure while fetching or decoding the static catalog resources.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error fetching {resource}: {source}")]
    Http {
        resource: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} returned status {status}")]
    Status { resource: String, status: u16 },

    #[error("IO error reading {resource}: {source}")]
    Io {
        resource: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {resource}: {source}")]
    Json {
        resource: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure reading or writing the durable key-value store.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("storage JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by (or about) the media backend.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum MediaError {
    #[error("media backend unavailable: {0}")]
    Unavailable(String),

    #[error("No audio URL available for this episode")]
    NoMediaUrl,

    #[error("Episode is not available for playback")]
    EpisodeUnavailable,

    #[error("{0}")]
    Command(String),
}
