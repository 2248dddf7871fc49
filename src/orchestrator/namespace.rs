//! Per-case log namespaces
//!
//! Each test case id owns one directory under the log root. The directory
//! is created if absent and reused on later runs; the conversation record
//! inside it is only ever appended to.

use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::common::paths;

/// Append-only transcript file inside every namespace
pub const CONVERSATION_FILE: &str = "conversation.log";

/// Hands out one directory per test case id
#[derive(Debug)]
pub struct LogNamespaces {
    root: PathBuf,
    /// directory name -> owning test id
    owners: HashMap<String, String>,
}

impl LogNamespaces {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            owners: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory name owned by `test_id`, claiming one if needed
    ///
    /// Distinct ids that sanitize to the same name get numbered suffixes,
    /// so no two ids ever share a directory.
    fn claim(&mut self, test_id: &str) -> String {
        let base = paths::sanitize_component(test_id);
        let mut name = base.clone();
        let mut n = 1;

        loop {
            match self.owners.get(&name) {
                Some(owner) if owner == test_id => return name,
                Some(_) => {
                    n += 1;
                    name = format!("{base}-{n}");
                }
                None => {
                    self.owners.insert(name.clone(), test_id.to_string());
                    return name;
                }
            }
        }
    }

    /// Create (if absent) and open the namespace for one case
    pub fn open(&mut self, test_id: &str) -> io::Result<CaseLog> {
        let name = self.claim(test_id);
        let dir = self.root.join(name);
        paths::ensure_dir(&dir)?;

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(dir.join(CONVERSATION_FILE))?;

        Ok(CaseLog { dir, file })
    }
}

/// Open namespace of the case currently running
#[derive(Debug)]
pub struct CaseLog {
    dir: PathBuf,
    file: File,
}

impl CaseLog {
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append one labelled entry to the conversation record
    ///
    /// Write failures are logged and otherwise ignored; they never change a
    /// case's verdict.
    pub fn record(&mut self, label: &str, body: &str) {
        let entry = format!("=== {label} ===\n{body}\n\n");
        if let Err(e) = self.file.write_all(entry.as_bytes()) {
            tracing::warn!(dir = %self.dir.display(), error = %e, "Failed to append to case log");
        }
    }
}
