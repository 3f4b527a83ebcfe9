use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CmsError {
    #[error("{page}: missing required field `{field}`")]
    MissingField { page: String, field: &'static str },

    #[error("{0:?}: page name must be a plain file name")]
    InvalidPageName(String),

    #[error("duplicate page name `{0}`")]
    DuplicatePage(String),

    #[error("template not found: {0:?}")]
    TemplateNotFound(PathBuf),

    #[error("members missing from team.member_order: {}", .0.join(", "))]
    MemberOrder(Vec<String>),

    #[error("{path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: config::ConfigError,
    },

    #[error("{path:?}: invalid record: {source}")]
    Record {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CmsError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CmsError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, CmsError>;
