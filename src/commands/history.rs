use super::AppState;
use crate::error::AppError;
use crate::models::history::HistoryEntry;
use crate::storage::history;

pub fn get_history(state: &AppState) -> Vec<HistoryEntry> {
    history::get_all(&state.history)
}

/// Delete one entry; an unknown id is reported as a validation error.
pub fn delete_history(state: &mut AppState, id: &str) -> crate::error::Result<()> {
    if history::delete_record(&mut state.history, id)? {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "No history entry with id: {}",
            id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_known_and_unknown_ids() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::open(dir.path());
        let entry = HistoryEntry::new("a.mp3", "https://example.com/a.mp3", 3);
        let id = entry.id.clone();
        history::add_record(&mut state.history, entry).unwrap();

        assert_eq!(get_history(&state).len(), 1);
        delete_history(&mut state, &id).unwrap();
        assert!(get_history(&state).is_empty());
        assert!(matches!(
            delete_history(&mut state, &id),
            Err(AppError::Validation(_))
        ));
    }
}
