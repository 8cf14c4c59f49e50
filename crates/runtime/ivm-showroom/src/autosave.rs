//! Debounced contact-draft persistence
//!
//! Every draft edit reschedules a single pending write; only the last edit
//! within the debounce window reaches storage. After a write the status
//! reads `saved` for a short hold, then returns to idle.

use crate::state::{Action, AutosaveStatus};
use crate::store::ShowroomStore;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::task::JoinHandle;

pub type SharedStore = Arc<RwLock<ShowroomStore>>;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);
pub const DEFAULT_STATUS_HOLD: Duration = Duration::from_millis(2000);

pub struct DraftAutosave {
    debounce: Duration,
    status_hold: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Default for DraftAutosave {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE, DEFAULT_STATUS_HOLD)
    }
}

impl DraftAutosave {
    pub fn new(debounce: Duration, status_hold: Duration) -> Self {
        Self {
            debounce,
            status_hold,
            pending: Mutex::new(None),
        }
    }

    /// Restart the debounce timer. Must be called from within a Tokio runtime.
    pub fn schedule(&self, store: SharedStore) {
        let debounce = self.debounce;
        let status_hold = self.status_hold;

        let task = tokio::spawn(async move {
            tokio::time::sleep(debounce).await;

            let saved = match store.write() {
                Ok(mut guard) => match guard.persist_draft() {
                    Ok(saved) => saved,
                    Err(e) => {
                        tracing::warn!("Failed to save contact draft: {}", e);
                        false
                    }
                },
                Err(_) => {
                    tracing::warn!("Draft store lock poisoned, skipping autosave");
                    false
                }
            };
            if !saved {
                return;
            }

            tokio::time::sleep(status_hold).await;
            if let Ok(mut guard) = store.write() {
                if guard.state().autosave == AutosaveStatus::Saved {
                    let _ = guard.dispatch(Action::SetAutosave(AutosaveStatus::Idle));
                }
            }
        });

        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }

    /// Drop any pending write (used when the draft is reset or submitted).
    pub fn cancel(&self) {
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.take() {
                previous.abort();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{DraftPatch, FormField};
    use crate::storage::{keys, LocalStorage, MemoryStorage};
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        inner: MemoryStorage,
        draft_writes: Arc<AtomicUsize>,
    }

    impl LocalStorage for Counting {
        fn get_item(&self, key: &str) -> crate::Result<Option<String>> {
            self.inner.get_item(key)
        }
        fn set_item(&self, key: &str, value: &str) -> crate::Result<()> {
            if key == keys::CONTACT_DRAFT {
                self.draft_writes.fetch_add(1, Ordering::SeqCst);
            }
            self.inner.set_item(key, value)
        }
        fn remove_item(&self, key: &str) -> crate::Result<()> {
            self.inner.remove_item(key)
        }
    }

    fn counting_store() -> (SharedStore, Arc<AtomicUsize>) {
        let writes = Arc::new(AtomicUsize::new(0));
        let storage = Counting {
            inner: MemoryStorage::new(),
            draft_writes: writes.clone(),
        };
        let store = ShowroomStore::load(Box::new(storage));
        (Arc::new(RwLock::new(store)), writes)
    }

    fn type_name(store: &SharedStore, value: &str) {
        store
            .write()
            .unwrap()
            .dispatch(Action::UpdateDraft(DraftPatch::field(FormField::Name, value)))
            .unwrap();
    }

    #[tokio::test]
    async fn test_rapid_edits_coalesce_into_one_write() {
        let (store, writes) = counting_store();
        let autosave = DraftAutosave::new(Duration::from_millis(40), Duration::from_millis(150));

        for partial in ["A", "Ad", "Ada"] {
            type_name(&store, partial);
            autosave.schedule(store.clone());
        }
        tokio::time::sleep(Duration::from_millis(70)).await;

        assert_eq!(writes.load(Ordering::SeqCst), 1);
        assert_eq!(store.read().unwrap().state().autosave, AutosaveStatus::Saved);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(store.read().unwrap().state().autosave, AutosaveStatus::Idle);
    }

    #[tokio::test]
    async fn test_cancel_prevents_write() {
        let (store, writes) = counting_store();
        let autosave = DraftAutosave::new(Duration::from_millis(30), Duration::from_millis(10));

        type_name(&store, "Ada");
        autosave.schedule(store.clone());
        autosave.cancel();
        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(writes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_draft_is_not_written() {
        let (store, writes) = counting_store();
        let autosave = DraftAutosave::new(Duration::from_millis(10), Duration::from_millis(10));

        autosave.schedule(store.clone());
        tokio::time::sleep(Duration::from_millis(40)).await;

        assert_eq!(writes.load(Ordering::SeqCst), 0);
    }
}
