//! Unidirectional store: state + reducer + storage side channel

use crate::state::{reduce, Action, AutosaveStatus, Changes, FieldErrors, FormDraft, ShowroomState};
use crate::storage::{keys, LocalStorage};
use crate::{validation, Result};
use serde::de::DeserializeOwned;

#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Accepted(FormDraft),
    Rejected(FieldErrors),
}

pub struct ShowroomStore {
    state: ShowroomState,
    storage: Box<dyn LocalStorage>,
}

impl ShowroomStore {
    /// Hydrate from storage. Unreadable or malformed keys are logged and
    /// skipped, leaving that slice at its default.
    pub fn load(storage: Box<dyn LocalStorage>) -> Self {
        let mut state = ShowroomState::default();

        if let Some(saved) = read_key::<Vec<String>>(storage.as_ref(), keys::SAVED_MODELS) {
            state.saved_models = saved;
        }
        if let Some(compare) = read_key::<Vec<String>>(storage.as_ref(), keys::COMPARE_LIST) {
            state.compare_list = compare;
        }
        if let Some(draft) = read_key::<FormDraft>(storage.as_ref(), keys::CONTACT_DRAFT) {
            state.form = draft;
        }

        Self { state, storage }
    }

    pub fn state(&self) -> &ShowroomState {
        &self.state
    }

    /// Reduce, then write whichever persisted slices changed. Draft edits
    /// are left to the debounced autosave.
    pub fn dispatch(&mut self, action: Action) -> Result<Changes> {
        let changes = reduce(&mut self.state, action);

        if changes.compare {
            let json = serde_json::to_string(&self.state.compare_list)?;
            self.storage.set_item(keys::COMPARE_LIST, &json)?;
        }
        if changes.saved {
            let json = serde_json::to_string(&self.state.saved_models)?;
            self.storage.set_item(keys::SAVED_MODELS, &json)?;
        }
        if changes.draft_cleared {
            self.storage.remove_item(keys::CONTACT_DRAFT)?;
        }
        if changes.draft && self.state.form.has_data() {
            self.state.autosave = AutosaveStatus::Saving;
        }

        Ok(changes)
    }

    /// Write the current draft if it holds anything. Returns whether a write
    /// happened.
    pub fn persist_draft(&mut self) -> Result<bool> {
        if !self.state.form.has_data() {
            return Ok(false);
        }
        let json = serde_json::to_string(&self.state.form)?;
        self.storage.set_item(keys::CONTACT_DRAFT, &json)?;
        self.state.autosave = AutosaveStatus::Saved;
        Ok(true)
    }

    /// Validate and, when clean, accept the enquiry and clear the draft.
    pub fn submit(&mut self) -> Result<Submission> {
        let errors = validation::validate(&self.state.form);
        if !errors.is_empty() {
            self.dispatch(Action::SetFormErrors(errors.clone()))?;
            return Ok(Submission::Rejected(errors));
        }

        self.dispatch(Action::SetSubmitting(true))?;
        self.dispatch(Action::SetSubmitSuccess(false))?;

        let draft = self.state.form.clone();
        tracing::info!(
            model = %draft.model_interest,
            purpose = %draft.purpose,
            "Contact enquiry accepted"
        );

        self.dispatch(Action::ResetForm)?;
        self.dispatch(Action::SetSubmitSuccess(true))?;
        Ok(Submission::Accepted(draft))
    }
}

fn read_key<T: DeserializeOwned>(storage: &dyn LocalStorage, key: &str) -> Option<T> {
    let raw = match storage.get_item(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("Failed to load {}: {}", key, e);
            None
        }
    }
}
