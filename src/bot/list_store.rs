use log::{error, info, warn};
use rand::seq::SliceRandom;
use rand::Rng;
use std::path::{Path, PathBuf};

use super::storage;
use crate::types::{ListError, ListResult};

/// A slice of the list, in stored order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListPage {
    pub items: Vec<String>,
    pub total: usize,
    /// More items exist past `items`
    pub truncated: bool,
}

/// Ordered item names, unique ignoring case, saved as a JSON array after every change
pub struct ListStore {
    items: Vec<String>,
    data_path: PathBuf,
}

impl ListStore {
    /// Load the list. A missing file is created empty; a corrupt one is left alone
    /// and the store starts empty in memory.
    pub fn load<P: AsRef<Path>>(data_path: P) -> Self {
        let mut store = Self {
            items: Vec::new(),
            data_path: data_path.as_ref().to_path_buf(),
        };

        match storage::read_json_optional::<Vec<String>>(&store.data_path) {
            Ok(Some(items)) => {
                info!("Loaded {} items from {}", items.len(), store.data_path.display());
                store.items = items;
            }
            Ok(None) => {
                info!("No list at {}, creating an empty one", store.data_path.display());
                store.save();
            }
            Err(e) => {
                warn!("Failed to load {}, using an empty list: {:#}", store.data_path.display(), e);
            }
        }

        store
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn pick_random(&self, count: usize) -> Vec<String> {
        self.pick_random_with(count, &mut rand::rng())
    }

    /// Up to `count` distinct items, drawn by shuffling a copy of the whole list
    pub fn pick_random_with<R: Rng>(&self, count: usize, rng: &mut R) -> Vec<String> {
        let mut pool = self.items.clone();
        pool.shuffle(rng);
        pool.truncate(count);
        pool
    }

    /// Append `name` unless an item with the same text (ignoring case) exists
    pub fn add(&mut self, name: &str) -> ListResult<usize> {
        if self.position_of(name).is_some() {
            return Err(ListError::Duplicate(name.to_string()));
        }
        self.items.push(name.to_string());
        self.save();
        Ok(self.items.len())
    }

    /// Remove the first item matching `name` ignoring case, returning the stored spelling
    pub fn remove(&mut self, name: &str) -> ListResult<String> {
        let index = self
            .position_of(name)
            .ok_or_else(|| ListError::NotFound(name.to_string()))?;
        let removed = self.items.remove(index);
        self.save();
        Ok(removed)
    }

    pub fn list(&self, count: usize) -> ListPage {
        let items: Vec<String> = self.items.iter().take(count).cloned().collect();
        ListPage {
            truncated: self.items.len() > items.len(),
            total: self.items.len(),
            items,
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        let folded = name.to_lowercase();
        self.items.iter().position(|item| item.to_lowercase() == folded)
    }

    fn save(&self) {
        if let Err(e) = storage::write_json(&self.data_path, &self.items, true) {
            error!("Failed to save list to {}: {:#}", self.data_path.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use std::fs;
    use tempfile::tempdir;

    fn store_with(dir: &Path, items: &[&str]) -> ListStore {
        let mut store = ListStore::load(dir.join("meals.json"));
        for item in items {
            store.add(item).unwrap();
        }
        store
    }

    #[test]
    fn test_missing_file_is_created_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meals.json");

        let store = ListStore::load(&path);

        assert!(store.is_empty());
        let on_disk: Vec<String> = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk.is_empty());
    }

    #[test_log::test]
    fn test_corrupt_file_is_left_untouched() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("meals.json");
        fs::write(&path, "{\"not\": \"an array\"}").unwrap();

        let store = ListStore::load(&path);

        assert!(store.is_empty());
        assert_eq!(fs::read_to_string(&path).unwrap(), "{\"not\": \"an array\"}");
    }

    #[test]
    fn test_add_is_case_insensitive_unique() {
        let dir = tempdir().unwrap();
        let mut store = store_with(dir.path(), &["Tacos"]);

        assert_eq!(store.add("tacos"), Err(ListError::Duplicate("tacos".into())));
        assert_eq!(store.items(), ["Tacos"]);
    }

    #[test]
    fn test_remove_matches_ignoring_case() {
        let dir = tempdir().unwrap();
        let mut store = store_with(dir.path(), &["Tacos", "Ramen"]);

        assert_eq!(store.remove("TACOS"), Ok("Tacos".to_string()));
        assert_eq!(store.items(), ["Ramen"]);
        assert_eq!(store.remove("tacos"), Err(ListError::NotFound("tacos".into())));
    }

    #[test]
    fn test_mutations_are_persisted() {
        let dir = tempdir().unwrap();
        {
            let mut store = store_with(dir.path(), &["Tacos", "Ramen", "Pho"]);
            store.remove("ramen").unwrap();
        }

        let reloaded = ListStore::load(dir.path().join("meals.json"));
        assert_eq!(reloaded.items(), ["Tacos", "Pho"]);
    }

    #[test_log::test]
    fn test_failed_save_keeps_in_memory_changes() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        fs::write(&blocker, "").unwrap();

        let mut store = ListStore::load(blocker.join("meals.json"));
        assert_eq!(store.add("Tacos"), Ok(1));
        assert_eq!(store.add("Ramen"), Ok(2));
        assert_eq!(store.remove("tacos"), Ok("Tacos".to_string()));

        let page = store.list(10);
        assert_eq!(page.items, vec!["Ramen"]);
        assert_eq!(page.total, 1);
        assert!(!blocker.join("meals.json").exists());
    }

    #[test]
    fn test_list_truncates_in_order() {
        let dir = tempdir().unwrap();
        let store = store_with(dir.path(), &["a", "b", "c"]);

        let page = store.list(2);
        assert_eq!(page.items, vec!["a", "b"]);
        assert_eq!(page.total, 3);
        assert!(page.truncated);

        assert!(!store.list(3).truncated);
    }

    #[test]
    fn test_pick_random_is_distinct_and_bounded() {
        let dir = tempdir().unwrap();
        let store = store_with(dir.path(), &["a", "b", "c", "d"]);
        let mut rng = StdRng::seed_from_u64(99);

        let picks = store.pick_random_with(3, &mut rng);
        assert_eq!(picks.len(), 3);
        let unique: HashSet<_> = picks.iter().collect();
        assert_eq!(unique.len(), 3);
        assert!(picks.iter().all(|p| store.items().contains(p)));

        assert_eq!(store.pick_random_with(10, &mut rng).len(), 4);
    }

    #[test]
    fn test_pick_random_on_empty_list() {
        let dir = tempdir().unwrap();
        let store = store_with(dir.path(), &[]);
        assert!(store.pick_random(3).is_empty());
    }
}
