//! JSON file winners table
//!
//! The whole table lives in one file that is rewritten through a temp file
//! and a rename, so an interrupted write leaves the previous table intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Winner, WinnerBackend, rank_order};
use crate::error::StoreError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WinnersFile {
    /// Next id to hand out; survives resets so ids never repeat
    next_id: i64,
    winners: Vec<Winner>,
}

pub struct JsonBackend {
    path: PathBuf,
}

impl JsonBackend {
    /// Use `path` as the table. The file is created on the first write;
    /// an existing file must parse.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let backend = Self {
            path: path.as_ref().to_path_buf(),
        };
        let table = backend.load()?;
        log::info!(
            "Opened JSON leaderboard at {} ({} winners)",
            backend.path.display(),
            table.winners.len()
        );
        Ok(backend)
    }

    fn load(&self) -> Result<WinnersFile, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(json) => Ok(serde_json::from_str(&json)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(WinnersFile {
                next_id: 1,
                winners: Vec::new(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, table: &WinnersFile) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(table)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl WinnerBackend for JsonBackend {
    fn insert(
        &mut self,
        name: &str,
        score: i64,
        created_at: DateTime<Utc>,
    ) -> Result<Winner, StoreError> {
        let mut table = self.load()?;
        let next_id = table
            .winners
            .iter()
            .map(|w| w.id + 1)
            .max()
            .unwrap_or(1)
            .max(table.next_id);
        let winner = Winner {
            id: next_id,
            name: name.to_string(),
            score: score.unsigned_abs(),
            created_at,
        };
        table.winners.push(winner.clone());
        table.next_id = next_id + 1;
        self.store(&table)?;
        Ok(winner)
    }

    fn top(&mut self, limit: usize) -> Result<Vec<Winner>, StoreError> {
        let mut winners = self.load()?.winners;
        winners.sort_by(rank_order);
        winners.truncate(limit);
        Ok(winners)
    }

    fn clear(&mut self) -> Result<(), StoreError> {
        let table = self.load()?;
        self.store(&WinnersFile {
            next_id: table.next_id,
            winners: Vec::new(),
        })
    }

    fn close(self: Box<Self>) -> Result<(), StoreError> {
        Ok(())
    }

    fn describe(&self) -> String {
        format!("json:{}", self.path.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(tag: &str) -> PathBuf {
        let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
        std::env::temp_dir().join(format!(
            "limbo_runner_{}_{}_{}.json",
            tag,
            std::process::id(),
            nanos
        ))
    }

    #[test]
    fn test_insert_and_rank() {
        let path = temp_path("rank");
        let mut backend = JsonBackend::open(&path).unwrap();
        backend.insert("low", 5, Utc::now()).unwrap();
        backend.insert("high", 50, Utc::now()).unwrap();
        backend.insert("tie", 50, Utc::now()).unwrap();

        let top = backend.top(2).unwrap();
        let names: Vec<_> = top.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, ["high", "tie"]);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_clear_keeps_ids_monotonic() {
        let path = temp_path("clear");
        let mut backend = JsonBackend::open(&path).unwrap();
        let first = backend.insert("a", 1, Utc::now()).unwrap();
        backend.clear().unwrap();
        assert!(backend.top(10).unwrap().is_empty());
        let second = backend.insert("b", 1, Utc::now()).unwrap();
        assert!(second.id > first.id);
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_reopen_sees_saved_winners() {
        let path = temp_path("reopen");
        {
            let mut backend = JsonBackend::open(&path).unwrap();
            backend.insert("keeper", 9, Utc::now()).unwrap();
        }
        let mut backend = JsonBackend::open(&path).unwrap();
        assert_eq!(backend.top(1).unwrap()[0].name, "keeper");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_corrupt_file_is_unavailable() {
        let path = temp_path("corrupt");
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            JsonBackend::open(&path),
            Err(StoreError::Unavailable(_))
        ));
        let _ = fs::remove_file(&path);
    }
}
