use std::path::PathBuf;

use thiserror::Error;

/// Errors returned by record sinks and the artifact writer.
#[derive(Debug, Error)]
pub enum SinkError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The data store answered with a non-success status.
    #[error("unexpected HTTP status {status} from {url}: {body}")]
    UnexpectedStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The insert succeeded but the returned row carried no `id`.
    #[error("inserted row for {table} has no id")]
    MissingId { table: String },

    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not serialize {context}: {source}")]
    Serialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid sink configuration: {0}")]
    Config(String),
}
