use serde_json::Value;

use crate::models::history::HistoryEntry;
use crate::storage::JsonStore;

pub const STORE_FILE: &str = "history.json";
const RECORDS_KEY: &str = "records";

/// Maximum number of entries kept; older ones are evicted.
pub const MAX_ENTRIES: usize = 50;

/// Add a history entry (newest first), evict beyond the cap, and persist.
pub fn add_record(store: &mut JsonStore, entry: HistoryEntry) -> crate::error::Result<()> {
    let mut records = load_records(store);
    records.insert(0, entry);
    records.truncate(MAX_ENTRIES);
    store.set(RECORDS_KEY, serde_json::to_value(&records)?);
    store.save()?;
    Ok(())
}

/// Get all history entries (already ordered newest first).
pub fn get_all(store: &JsonStore) -> Vec<HistoryEntry> {
    load_records(store)
}

/// Delete a history entry by ID. Returns whether anything was removed.
pub fn delete_record(store: &mut JsonStore, id: &str) -> crate::error::Result<bool> {
    let mut records = load_records(store);
    let before = records.len();
    records.retain(|r| r.id != id);
    let removed = records.len() != before;
    store.set(RECORDS_KEY, serde_json::to_value(&records)?);
    store.save()?;
    Ok(removed)
}

/// Load entries from the store. A missing or non-list value reads as empty;
/// malformed entries are skipped so the rest survive the next save.
fn load_records(store: &JsonStore) -> Vec<HistoryEntry> {
    let items = match store.get(RECORDS_KEY) {
        None => return Vec::new(),
        Some(Value::Array(items)) => items,
        Some(_) => {
            log::warn!("History records are not a list; ignoring them");
            return Vec::new();
        }
    };
    items
        .into_iter()
        .filter_map(|item| match HistoryEntry::from_stored(item) {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping malformed history entry: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> HistoryEntry {
        HistoryEntry::new(name, format!("https://example.com/{}", name), 100)
    }

    fn temp_store() -> (tempfile::TempDir, JsonStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonStore::open(dir.path().join(STORE_FILE));
        (dir, store)
    }

    #[test]
    fn add_puts_newest_first() {
        let (_dir, mut store) = temp_store();
        add_record(&mut store, entry("old.mp3")).unwrap();
        add_record(&mut store, entry("new.mp3")).unwrap();
        let all = get_all(&store);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].file_name, "new.mp3");
        assert_eq!(all[1].file_name, "old.mp3");
    }

    #[test]
    fn cap_evicts_oldest() {
        let (_dir, mut store) = temp_store();
        for i in 0..(MAX_ENTRIES + 7) {
            add_record(&mut store, entry(&format!("{}.mp3", i))).unwrap();
            assert!(get_all(&store).len() <= MAX_ENTRIES);
        }
        let all = get_all(&store);
        assert_eq!(all.len(), MAX_ENTRIES);
        assert_eq!(all[0].file_name, format!("{}.mp3", MAX_ENTRIES + 6));
        assert_eq!(all[MAX_ENTRIES - 1].file_name, "7.mp3");
    }

    #[test]
    fn mixed_add_and_delete_keeps_invariants() {
        let (_dir, mut store) = temp_store();
        let mut ids = Vec::new();
        for i in 0..120 {
            let e = entry(&format!("{}.mp3", i));
            ids.push(e.id.clone());
            add_record(&mut store, e).unwrap();
            if i % 3 == 0 {
                delete_record(&mut store, &ids[i / 2]).unwrap();
            }
            let all = get_all(&store);
            assert!(all.len() <= MAX_ENTRIES);
            // Newest-first by insertion: indices strictly decrease.
            let order: Vec<usize> = all
                .iter()
                .map(|r| r.file_name.trim_end_matches(".mp3").parse().unwrap())
                .collect();
            assert!(order.windows(2).all(|w| w[0] > w[1]), "{:?}", order);
        }
    }

    #[test]
    fn delete_removes_by_id() {
        let (_dir, mut store) = temp_store();
        let keep = entry("keep.mp3");
        let remove = entry("remove.mp3");
        let remove_id = remove.id.clone();
        add_record(&mut store, keep).unwrap();
        add_record(&mut store, remove).unwrap();

        assert!(delete_record(&mut store, &remove_id).unwrap());
        let all = get_all(&store);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].file_name, "keep.mp3");
    }

    #[test]
    fn delete_nonexistent_id_is_noop() {
        let (_dir, mut store) = temp_store();
        add_record(&mut store, entry("existing.mp3")).unwrap();
        assert!(!delete_record(&mut store, "nonexistent").unwrap());
        assert_eq!(get_all(&store).len(), 1);
    }

    #[test]
    fn corrupt_records_return_empty_vec() {
        let (_dir, mut store) = temp_store();
        store.set(RECORDS_KEY, serde_json::json!({"not": "a list"}));
        assert!(get_all(&store).is_empty());
    }

    #[test]
    fn corrupt_file_returns_empty_vec() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(&path, "[{\"truncated\":").unwrap();
        assert!(get_all(&JsonStore::open(&path)).is_empty());
    }

    #[test]
    fn malformed_entry_does_not_hide_the_rest() {
        let (_dir, mut store) = temp_store();
        let good = entry("good.mp3");
        store.set(
            RECORDS_KEY,
            serde_json::json!([serde_json::to_value(&good).unwrap(), {"url": 7}]),
        );
        let all = get_all(&store);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, good.id);

        add_record(&mut store, entry("next.mp3")).unwrap();
        let names: Vec<_> = get_all(&store).into_iter().map(|r| r.file_name).collect();
        assert_eq!(names, vec!["next.mp3", "good.mp3"]);
    }

    #[test]
    fn legacy_record_deletes_by_listed_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(
            &path,
            r#"{"records":[{"name":"old.mp3","url":"https://raw.githubusercontent.com/u/r/main/uploads/1_old.mp3","size":2048,"date":"2025-01-05T10:00:00.000Z"}]}"#,
        )
        .unwrap();

        let listed_id = get_all(&JsonStore::open(&path))[0].id.clone();
        assert_eq!(get_all(&JsonStore::open(&path))[0].id, listed_id);

        let mut store = JsonStore::open(&path);
        assert!(delete_record(&mut store, &listed_id).unwrap());
        assert!(get_all(&JsonStore::open(&path)).is_empty());
    }

    #[test]
    fn persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let mut store = JsonStore::open(&path);
        add_record(&mut store, entry("kept.mp3")).unwrap();
        let all = get_all(&JsonStore::open(&path));
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].file_name, "kept.mp3");
    }
}
