//! Sender collaborator: iterates the file-list file, one path per line.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Lines};
use std::path::Path;

use log::warn;

/// Iterates paths out of a textual file-list, one per line, trailing CR/LF
/// tolerated. An I/O error while reading the list stops iteration the same
/// way end-of-file does (the original does not distinguish the two: it
/// simply stops filling the sender's window and moves on to draining it).
pub struct FileList {
    lines: Lines<BufReader<File>>,
    exhausted: bool,
}

impl FileList {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::open(path)?;
        Ok(FileList {
            lines: BufReader::new(file).lines(),
            exhausted: false,
        })
    }
}

impl Iterator for FileList {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if self.exhausted {
            return None;
        }
        match self.lines.next() {
            Some(Ok(mut line)) => {
                while matches!(line.chars().last(), Some('\r') | Some('\n')) {
                    line.pop();
                }
                Some(line)
            }
            Some(Err(err)) => {
                warn!("error reading file list: {err}");
                self.exhausted = true;
                None
            }
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}
