// src/fetch/cache.rs

use std::{
    cell::RefCell,
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use tracing::{info, warn};
use url::Url;

use crate::error::{Result, ScrapeError};

const INDEX_FILE: &str = "index.json";

/// Response bodies on disk, one file per URL, with `index.json` mapping
/// URL → body file name.
pub struct ResponseCache {
    dir: PathBuf,
    index: RefCell<BTreeMap<String, String>>,
}

impl ResponseCache {
    /// Open (creating if needed) the cache in `dir`. A corrupt or unreadable
    /// index is discarded rather than failing the run.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir).map_err(|e| ScrapeError::io(&dir, e))?;

        let index_path = dir.join(INDEX_FILE);
        let index = match fs::read(&index_path) {
            Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|e| {
                warn!(path = %index_path.display(), error = %e, "discarding corrupt cache index");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                warn!(
                    path = %index_path.display(),
                    error = %e,
                    "cannot read cache index, starting empty"
                );
                BTreeMap::new()
            }
        };

        Ok(Self {
            dir,
            index: RefCell::new(index),
        })
    }

    pub fn len(&self) -> usize {
        self.index.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.borrow().is_empty()
    }

    pub fn get(&self, url: &Url) -> Result<Option<Vec<u8>>> {
        let Some(name) = self.index.borrow().get(url.as_str()).cloned() else {
            return Ok(None);
        };
        let path = self.dir.join(name);
        match fs::read(&path) {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ScrapeError::io(path, e)),
        }
    }

    pub fn put(&self, url: &Url, body: &[u8]) -> Result<()> {
        let name = {
            let mut index = self.index.borrow_mut();
            let next = format!("{:06}.body", index.len());
            index.entry(url.to_string()).or_insert(next).clone()
        };
        let path = self.dir.join(&name);
        fs::write(&path, body).map_err(|e| ScrapeError::io(&path, e))?;
        self.write_index()
    }

    /// Remove every cached body and the index. Returns how many entries were dropped.
    pub fn clear(&self) -> Result<usize> {
        let dropped = std::mem::take(&mut *self.index.borrow_mut());
        for name in dropped.values() {
            let path = self.dir.join(name);
            if let Err(e) = fs::remove_file(&path) {
                if e.kind() != ErrorKind::NotFound {
                    return Err(ScrapeError::io(path, e));
                }
            }
        }
        self.write_index()?;
        info!(dir = %self.dir.display(), entries = dropped.len(), "cache cleared");
        Ok(dropped.len())
    }

    fn write_index(&self) -> Result<()> {
        let path = self.dir.join(INDEX_FILE);
        let json = serde_json::to_vec_pretty(&*self.index.borrow())
            .map_err(|e| ScrapeError::io(&path, e.into()))?;
        fs::write(&path, json).map_err(|e| ScrapeError::io(&path, e))
    }
}
