//! Endpoint parsing utilities for CLI commands
//!
//! Commands read from and write to *endpoints*: either a host file or the
//! process's standard streams.
//!
//! # Notation
//!
//! - `-` - stdin when reading, stdout when writing
//! - anything else - path on the host filesystem
//!
//! This is the same convention `cat`, `tar` and `dd`-style tools use.

use anyhow::{Context, Result};
use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

/// A parsed endpoint specification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    /// Standard input or output, depending on direction
    Stdio,
    /// Path on the host filesystem
    Path(PathBuf),
}

impl Endpoint {
    /// Parse an endpoint specification
    ///
    /// # Examples
    ///
    /// ```ignore
    /// assert_eq!(Endpoint::parse("-"), Endpoint::Stdio);
    /// assert!(matches!(Endpoint::parse("./data.bin"), Endpoint::Path(_)));
    /// ```
    pub fn parse(spec: &str) -> Self {
        if spec == "-" {
            Endpoint::Stdio
        } else {
            Endpoint::Path(PathBuf::from(spec))
        }
    }

    /// Get the host path if this is a Path
    pub fn path(&self) -> Option<&Path> {
        match self {
            Endpoint::Path(path) => Some(path),
            Endpoint::Stdio => None,
        }
    }

    /// Open for reading
    pub fn open_read(&self) -> Result<Box<dyn Read>> {
        match self {
            Endpoint::Stdio => Ok(Box::new(io::stdin().lock())),
            Endpoint::Path(path) => {
                let file = File::open(path)
                    .with_context(|| format!("Failed to open '{}'", path.display()))?;
                Ok(Box::new(file))
            }
        }
    }

    /// Open for writing, truncating an existing file
    pub fn open_write(&self) -> Result<Box<dyn Write>> {
        match self {
            Endpoint::Stdio => Ok(Box::new(io::stdout().lock())),
            Endpoint::Path(path) => {
                let file = File::create(path)
                    .with_context(|| format!("Failed to create '{}'", path.display()))?;
                Ok(Box::new(file))
            }
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Stdio => write!(f, "-"),
            Endpoint::Path(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Parse a copy operation with source and destination endpoints
///
/// This validates that the copy operation makes sense (i.e., the source is
/// not also the destination, which would truncate it before it is read).
pub fn parse_copy_operation(source: &str, dest: &str) -> Result<(Endpoint, Endpoint)> {
    let src = Endpoint::parse(source);
    let dst = Endpoint::parse(dest);

    if let (Some(a), Some(b)) = (src.path(), dst.path()) {
        let same = match (a.canonicalize(), b.canonicalize()) {
            (Ok(a), Ok(b)) => a == b,
            _ => a == b,
        };
        if same {
            anyhow::bail!(
                "Source and destination are the same file '{}'",
                a.display()
            );
        }
    }

    Ok((src, dst))
}
