use crate::types::PostId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title must not be empty")]
    EmptyTitle,

    #[error("Slug must contain at least one letter or digit")]
    EmptySlug,

    #[error("No post id is left to allocate")]
    NoIdsLeft,
}

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to write {path:?}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to lock {path:?}")]
    Lock {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse posts in {path:?}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to serialize posts")]
    Serialize(#[source] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum BlogError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Post {0} does not exist")]
    NotFound(PostId),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("Failed to render {template_name:?} template")]
    Render {
        template_name: String,
        source: handlebars::RenderError,
    },

    #[error("Failed to register {template_name:?} template")]
    Template {
        template_name: String,
        source: Box<handlebars::TemplateError>,
    },
}

impl BlogError {
    /// Persistence failures are transient from the admin's point of view and
    /// the same request can be submitted again.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BlogError::Persistence(_))
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read {path:?}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse {path:?}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Failed to serialize configuration")]
    Serialize(#[source] toml::ser::Error),

    #[error("Route prefix {0:?} must be a single path segment")]
    RoutePrefix(String),
}

pub type Result<T, E = BlogError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error(transparent)]
    Blog(#[from] BlogError),

    #[error("Blog task panicked or was cancelled")]
    Task(#[from] tokio::task::JoinError),

    #[error("Invalid address {address:?}")]
    Address {
        address: String,
        source: std::net::AddrParseError,
    },

    #[error("Server stopped")]
    Serve(#[source] Box<dyn std::error::Error + Send + Sync>),
}
