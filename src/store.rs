//! Song persistence: one pretty JSON file per generated song.

use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::song::Song;

const EXTENSION: &str = "json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("song store I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("song record is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no song record with id `{0}`")]
    NotFound(String),
}

/// A stored song and when it was made.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongRecord {
    pub song: Song,
    pub created_at_unix: u64,
}

impl SongRecord {
    /// Stamp `song` with the current time.
    pub fn now(song: Song) -> Self {
        let created_at_unix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default();
        Self {
            song,
            created_at_unix,
        }
    }
}

/// Directory of song records keyed by file stem.
#[derive(Debug, Clone)]
pub struct SongStore {
    dir: PathBuf,
}

impl SongStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Default path for the song store.
    pub fn default_dir() -> PathBuf {
        let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push(".housegen");
        path.push("songs");
        path
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.{EXTENSION}"))
    }

    /// Save `song` stamped with the current time. Returns the record id.
    pub fn save(&self, song: &Song) -> Result<String, StoreError> {
        self.save_record(&SongRecord::now(song.clone()))
    }

    /// Save a record, creating the directory as needed. Returns the record id.
    pub fn save_record(&self, record: &SongRecord) -> Result<String, StoreError> {
        std::fs::create_dir_all(&self.dir)?;

        let base = format!("song-{}", record.created_at_unix);
        let mut id = base.clone();
        let mut n = 1;
        while self.path_for(&id).exists() {
            n += 1;
            id = format!("{base}-{n}");
        }

        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(self.path_for(&id), json)?;
        info!("saved song {id} to {}", self.dir.display());
        Ok(id)
    }

    pub fn load(&self, id: &str) -> Result<SongRecord, StoreError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(StoreError::NotFound(id.to_string()));
        }
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Record ids in the store, sorted. An absent directory is an empty store.
    pub fn list(&self) -> Result<Vec<String>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::FilterInformation;
    use crate::grid::{Bar, Instrument};
    use crate::song::SongSection;

    fn song() -> Song {
        let mut bar = Bar::example();
        bar.attach_filter(
            Instrument::Pad,
            FilterInformation::new("lowpass", vec![1.0, 0.75, 0.5, 0.25]),
        );
        let mut song = Song::new();
        song.append_section(SongSection::new("Intro", vec![bar, Bar::rest()]));
        song
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = SongStore::new(dir.path());

        let record = SongRecord {
            song: song(),
            created_at_unix: 1_700_000_000,
        };
        let id = store.save_record(&record).unwrap();
        assert_eq!(id, "song-1700000000");
        assert_eq!(store.load(&id).unwrap(), record);
    }

    #[test]
    fn same_timestamp_gets_distinct_ids() {
        let dir = tempfile::tempdir().unwrap();
        let store = SongStore::new(dir.path());
        let record = SongRecord {
            song: song(),
            created_at_unix: 42,
        };
        let a = store.save_record(&record).unwrap();
        let b = store.save_record(&record).unwrap();
        assert_ne!(a, b);
        assert_eq!(store.list().unwrap(), vec![a, b]);
    }

    #[test]
    fn save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = SongStore::new(dir.path().join("nested").join("songs"));
        let id = store.save(&song()).unwrap();
        assert!(store.dir().join(format!("{id}.json")).exists());
    }

    #[test]
    fn load_unknown_id_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = SongStore::new(dir.path());
        assert!(matches!(store.load("nope"), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn list_of_missing_dir_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = SongStore::new(dir.path().join("absent"));
        assert!(store.list().unwrap().is_empty());
    }
}
