//! The novelfetch error model.
//!
//! Library crates return [`NovelFetchError`]; the `novelfetch` binary reports
//! it through `color-eyre`. A crawl that fails part-way is not an error: it
//! ends with a [`crate::StopReason`] and keeps the chapters it already has.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum NovelFetchError {
    /// Unreadable config file, or a configured profile with a bad selector.
    #[error("config error: {message}")]
    Config { message: String },

    /// A chapter page could not be fetched: connect failure, timeout,
    /// redirect loop, or a non-2xx status.
    #[error("network error: {0}")]
    Network(String),

    /// A CSS selector that `scraper` refuses.
    #[error("parse error: {message}")]
    Parse { message: String },

    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Rejected request: missing or non-http(s) URL, zero chapter cap.
    #[error("validation error: {message}")]
    Validation { message: String },

    /// The start page itself produced no chapter.
    #[error("no chapter could be extracted from {url}")]
    NoChapters { url: String },
}

pub type Result<T> = std::result::Result<T, NovelFetchError>;

impl NovelFetchError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Attach the file that failed to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_formatting() {
        let err = NovelFetchError::config("bad selector in profile");
        assert_eq!(err.to_string(), "config error: bad selector in profile");

        let err = NovelFetchError::validation("max_chapters must be at least 1");
        assert!(err.to_string().contains("max_chapters"));
    }

    #[test]
    fn io_error_names_the_file() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = NovelFetchError::io("/tmp/novelfetch.toml", source);
        assert!(err.to_string().contains("novelfetch.toml"));
    }

    #[test]
    fn no_chapters_names_the_start_url() {
        let err = NovelFetchError::NoChapters {
            url: "https://novelfull.net/book/chapter-1.html".into(),
        };
        assert_eq!(
            err.to_string(),
            "no chapter could be extracted from https://novelfull.net/book/chapter-1.html"
        );
    }
}
