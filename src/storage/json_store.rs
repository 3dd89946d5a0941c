// Flat-file JSON store
//
// Three JSON arrays under one directory: creators.json, content_sets.json,
// cards.json. Each operation reads the whole file and rewrites it; writes go
// through a temp file and a rename so a crash never leaves half a file.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::ContentStore;
use crate::content::{ContentCard, ContentSet, Creator};

const CREATORS_FILE: &str = "creators.json";
const SETS_FILE: &str = "content_sets.json";
const CARDS_FILE: &str = "cards.json";

pub struct JsonStore {
    data_dir: PathBuf,
    // Serialises read-modify-write cycles within this process
    lock: Mutex<()>,
}

impl JsonStore {
    /// Open (creating if needed) a store rooted at `data_dir`.
    pub fn open(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let store = Self {
            data_dir,
            lock: Mutex::new(()),
        };
        for file in [CREATORS_FILE, SETS_FILE, CARDS_FILE] {
            let path = store.data_dir.join(file);
            if !path.exists() {
                write_list::<serde_json::Value>(&path, &[])?;
            }
        }
        tracing::debug!("Opened JSON store at {}", store.data_dir.display());
        Ok(store)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn path(&self, file: &str) -> PathBuf {
        self.data_dir.join(file)
    }

    /// Read-modify-write one file under the lock.
    fn update<T, R, F>(&self, file: &str, f: F) -> Result<R>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&mut Vec<T>) -> (R, bool),
    {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("JSON store lock poisoned"))?;
        let path = self.path(file);
        let mut items: Vec<T> = read_list(&path)?;
        let (result, changed) = f(&mut items);
        if changed {
            write_list(&path, &items)?;
        }
        Ok(result)
    }

    fn read<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let _guard = self
            .lock
            .lock()
            .map_err(|_| anyhow::anyhow!("JSON store lock poisoned"))?;
        read_list(&self.path(file))
    }
}

fn read_list<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

fn write_list<T: Serialize>(path: &Path, items: &[T]) -> Result<()> {
    let json = serde_json::to_string_pretty(items).context("Failed to serialize records")?;
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json).with_context(|| format!("Failed to write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))?;
    Ok(())
}

impl ContentStore for JsonStore {
    fn add_creator(&self, creator: &Creator) -> Result<bool> {
        self.update(CREATORS_FILE, |creators: &mut Vec<Creator>| {
            if creators.iter().any(|c| c.creator_id == creator.creator_id) {
                return (false, false);
            }
            creators.push(creator.clone());
            (true, true)
        })
    }

    fn get_creator(&self, creator_id: &str) -> Result<Option<Creator>> {
        Ok(self
            .read::<Creator>(CREATORS_FILE)?
            .into_iter()
            .find(|c| c.creator_id == creator_id))
    }

    fn list_creators(&self) -> Result<Vec<Creator>> {
        self.read(CREATORS_FILE)
    }

    fn delete_creator(&self, creator_id: &str) -> Result<bool> {
        self.update(CREATORS_FILE, |creators: &mut Vec<Creator>| {
            let before = creators.len();
            creators.retain(|c| c.creator_id != creator_id);
            let removed = creators.len() != before;
            (removed, removed)
        })
    }

    fn add_content_set(&self, set: &ContentSet) -> Result<bool> {
        self.update(SETS_FILE, |sets: &mut Vec<ContentSet>| {
            if sets.iter().any(|s| s.set_id == set.set_id) {
                return (false, false);
            }
            sets.push(set.clone());
            (true, true)
        })
    }

    fn get_content_set(&self, set_id: &str) -> Result<Option<ContentSet>> {
        Ok(self
            .read::<ContentSet>(SETS_FILE)?
            .into_iter()
            .find(|s| s.set_id == set_id))
    }

    fn update_content_set(&self, set: &ContentSet) -> Result<bool> {
        self.update(SETS_FILE, |sets: &mut Vec<ContentSet>| {
            match sets.iter_mut().find(|s| s.set_id == set.set_id) {
                Some(existing) => {
                    *existing = set.clone();
                    (true, true)
                }
                None => (false, false),
            }
        })
    }

    fn list_content_sets(&self, creator_id: &str) -> Result<Vec<ContentSet>> {
        Ok(self
            .read::<ContentSet>(SETS_FILE)?
            .into_iter()
            .filter(|s| s.creator_id == creator_id)
            .collect())
    }

    fn add_card(&self, card: &ContentCard) -> Result<bool> {
        self.update(CARDS_FILE, |cards: &mut Vec<ContentCard>| {
            if cards.iter().any(|c| c.card_id == card.card_id) {
                return (false, false);
            }
            cards.push(card.clone());
            (true, true)
        })
    }

    fn get_cards_by_set(&self, set_id: &str) -> Result<Vec<ContentCard>> {
        let mut cards: Vec<ContentCard> = self
            .read::<ContentCard>(CARDS_FILE)?
            .into_iter()
            .filter(|c| c.set_id == set_id)
            .collect();
        cards.sort_by_key(|c| c.order_index);
        Ok(cards)
    }

    /// One read-modify-write for the whole batch.
    fn add_cards(&self, new_cards: &[ContentCard]) -> Result<usize> {
        self.update(CARDS_FILE, |cards: &mut Vec<ContentCard>| {
            let mut added = 0;
            for card in new_cards {
                if !cards.iter().any(|c| c.card_id == card.card_id) {
                    cards.push(card.clone());
                    added += 1;
                }
            }
            (added, added > 0)
        })
    }
}
