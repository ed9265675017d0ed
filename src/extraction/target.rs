//! Destination directory for one report

use crate::error::ExtractError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Separator between the session identifier and the directory name
const SESSION_SEPARATOR: &str = "__";

/// The resolved directory receiving one report's files
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionTarget {
    path: PathBuf,
}

impl ExtractionTarget {
    /// Resolve `<save_dir>/[<session_id>__]<directory_name>` without touching the disk
    ///
    /// The session identifier (when non-empty) and the directory name must each be a
    /// single safe path component, see [`sanitize_component`].
    pub fn resolve(
        save_dir: &Path,
        session_id: &str,
        directory_name: &[u8],
    ) -> Result<Self, ExtractError> {
        let directory_name = sanitize_component(directory_name)?;
        let leaf = if session_id.is_empty() {
            directory_name.to_string()
        } else {
            let session_id = sanitize_component(session_id.as_bytes())?;
            format!("{session_id}{SESSION_SEPARATOR}{directory_name}")
        };
        Ok(Self {
            path: save_dir.join(leaf),
        })
    }

    /// Absolute path of the directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create the directory (owner-only on unix), tolerating an existing one
    ///
    /// The parent (`save_dir`) must already exist.
    pub fn create(&self) -> Result<(), ExtractError> {
        let mut builder = std::fs::DirBuilder::new();
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o700);
        }

        match builder.create(&self.path) {
            Ok(()) => {
                debug!(path = ?self.path, "created extraction directory");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists && self.path.is_dir() => {
                debug!(path = ?self.path, "extraction directory already exists");
                Ok(())
            }
            Err(source) => Err(ExtractError::CreateDirectory {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Path of a file inside the target, after checking the name is a safe component
    pub fn file_path(&self, name: &[u8]) -> Result<PathBuf, ExtractError> {
        let name = sanitize_component(name)?;
        Ok(self.path.join(name))
    }
}

/// Accept `raw` only if it names exactly one entry inside its parent directory
///
/// Rejects non-UTF-8 bytes, empty names, `.`, `..`, and anything containing `/`, `\`
/// or NUL.
///
/// Container names are already cut at their first NUL when decoded, so the NUL check
/// only fires for the session identifier taken from the request header.
pub fn sanitize_component(raw: &[u8]) -> Result<&str, ExtractError> {
    let unsafe_path = |reason| ExtractError::UnsafePath {
        component: String::from_utf8_lossy(raw).into_owned(),
        reason,
    };

    let name = std::str::from_utf8(raw).map_err(|_| unsafe_path("not valid UTF-8"))?;
    match name {
        "" => Err(unsafe_path("empty name")),
        "." => Err(unsafe_path("current directory segment")),
        ".." => Err(unsafe_path("parent directory segment")),
        _ if name.contains(['/', '\\']) => Err(unsafe_path("contains a path separator")),
        _ if name.contains('\0') => Err(unsafe_path("contains a NUL byte")),
        _ => Ok(name),
    }
}
