//! Errors that end the editor.
//!
//! Only fatal conditions become an [`Error`]. Recoverable ones (a failed
//! save, a cancelled prompt, the unsaved-changes quit guard) are reported on
//! the message bar and never leave the editor.

use std::io;
use std::path::PathBuf;

/// A fatal editor error.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The file named on the command line exists but could not be read.
    #[error("can't open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Raw mode, the window size query, or terminal input/output failed.
    #[error("{0}")]
    Terminal(#[from] io::Error),
}

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_error_names_the_file() {
        let err = Error::Open {
            path: PathBuf::from("notes.txt"),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "permission denied"),
        };
        assert_eq!(err.to_string(), "can't open notes.txt: permission denied");
    }

    #[test]
    fn open_error_exposes_source() {
        use std::error::Error as _;

        let err = Error::Open {
            path: PathBuf::from("x"),
            source: io::Error::other("boom"),
        };
        assert!(err.source().is_some());
    }

    #[test]
    fn terminal_error_from_io() {
        let err: Error = io::Error::new(io::ErrorKind::UnexpectedEof, "stdin closed").into();
        assert!(matches!(err, Error::Terminal(_)));
        assert_eq!(err.to_string(), "stdin closed");
    }
}
