//! Receiver collaborator: scans a directory for a byte-identical file and
//! appends the outcome to the match log.

use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::err::Error;

/// Scans `dir` for regular files byte-equal to a given buffer, appending
/// one `"<remote> <local-or-UNKNOWN>\n"` line per search to `match_log`.
/// The directory is re-enumerated from scratch on every search, which is
/// the idiomatic equivalent of `rewinddir`.
pub struct SearchHandler {
    dir: PathBuf,
    match_log: File,
}

impl SearchHandler {
    pub fn new(dir: &Path, match_log_path: &Path) -> Result<Self, Error> {
        // Fail fast if the directory cannot even be listed once.
        fs::read_dir(dir)?;
        let match_log = OpenOptions::new()
            .create(true)
            .append(true)
            .open(match_log_path)?;
        Ok(SearchHandler {
            dir: dir.to_path_buf(),
            match_log,
        })
    }

    pub fn search(&mut self, remote_name: &str, data: &[u8]) -> Result<(), Error> {
        let found = self.find_matching_file(data)?;

        debug!(
            "search result for remote file {remote_name:?}: {:?}",
            found.as_deref().unwrap_or("UNKNOWN")
        );

        let line = format!("{remote_name} {}\n", found.as_deref().unwrap_or("UNKNOWN"));
        self.match_log.write_all(line.as_bytes())?;
        info!("recorded match: {remote_name} -> {}", found.as_deref().unwrap_or("UNKNOWN"));
        Ok(())
    }

    fn find_matching_file(&self, data: &[u8]) -> Result<Option<String>, Error> {
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            let Ok(file_type) = entry.file_type() else {
                continue;
            };
            if !file_type.is_file() {
                continue;
            }
            let Ok(metadata) = entry.metadata() else {
                continue;
            };
            if metadata.len() as usize != data.len() {
                continue;
            }
            let contents = fs::read(entry.path())?;
            if contents == data {
                return Ok(Some(entry.file_name().to_string_lossy().into_owned()));
            }
        }
        Ok(None)
    }
}
