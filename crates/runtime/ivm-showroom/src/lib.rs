//! IVM Showroom
//!
//! The view-model behind the marketing site, expressed as an explicit
//! state struct and a reducer instead of ambient shared state:
//!
//! ```text
//!   Action ──> reduce(state) ──> Changes ──> storage side channel
//!                                   │
//!                                   └──> draft autosave (debounced)
//! ```
//!
//! Persistence mirrors browser local storage: one string value per key,
//! each holding JSON. Keys are listed in [`storage::keys`].

pub mod autosave;
pub mod state;
pub mod storage;
pub mod store;
pub mod validation;

pub use autosave::{DraftAutosave, SharedStore};
pub use state::{
    reduce, Action, AutosaveStatus, Changes, DraftPatch, FieldErrors, FormDraft, FormField,
    Selection, ShowroomState, MAX_COMPARE,
};
pub use storage::{FileStorage, LocalStorage, MemoryStorage};
pub use store::{ShowroomStore, Submission};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Store lock poisoned")]
    Poisoned,
}

pub type Result<T> = std::result::Result<T, StoreError>;
