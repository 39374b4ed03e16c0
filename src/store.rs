// src/store.rs
// Raw signal cache. One CSV per signal under the cache dir. A file that is
// present but damaged is demoted to a miss, logged, and left for the next
// save to replace, so a bad cache never strands the pipeline.

use std::fs;
use std::io::BufWriter;
use std::path::PathBuf;

use tracing::warn;

use crate::error::{Error, Result};
use crate::signal::SignalKind;
use crate::table::SignalTable;

pub struct Store {
    dir: PathBuf,
}

impl Store {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path(&self, kind: SignalKind) -> PathBuf {
        self.dir.join(kind.cache_file())
    }

    /// Cached table for `kind`, or `None` on a miss. Damaged files count as
    /// misses; real I/O failures still propagate.
    pub fn load(&self, kind: SignalKind) -> Result<Option<SignalTable>> {
        let path = self.path(kind);
        if !path.exists() {
            return Ok(None);
        }
        match SignalTable::read_csv(kind, &path) {
            Ok(table) => Ok(Some(table)),
            Err(Error::MalformedCache { path, reason }) => {
                warn!(path = %path.display(), reason, "ignoring damaged cache file");
                Ok(None)
            }
            Err(Error::Csv(e)) => {
                warn!(path = %path.display(), error = %e, "ignoring unreadable cache file");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Write `table` to its cache slot. Goes to a sibling tmp file first and
    /// lands with a rename, so a crash mid-write leaves no torn CSV behind.
    pub fn save(&self, table: &SignalTable) -> Result<PathBuf> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(table.kind);
        let tmp = path.with_extension("csv.tmp");
        {
            let file = fs::File::create(&tmp)?;
            table.write_csv(BufWriter::new(file))?;
        }
        fs::rename(&tmp, &path)?;
        Ok(path)
    }
}
