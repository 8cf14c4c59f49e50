//! Showroom state and reducer

use crate::validation;
use ivm_core::{CategoryFilter, SortOrder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compare-list capacity.
pub const MAX_COMPARE: usize = 3;

/// Field key -> message, keyed by the form's wire names (`modelInterest`).
pub type FieldErrors = BTreeMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    Name,
    Email,
    Phone,
    ModelInterest,
    Purpose,
    Message,
}

impl FormField {
    pub const ALL: [FormField; 6] = [
        Self::Name,
        Self::Email,
        Self::Phone,
        Self::ModelInterest,
        Self::Purpose,
        Self::Message,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::ModelInterest => "modelInterest",
            Self::Purpose => "purpose",
            Self::Message => "message",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub model_interest: String,
    pub purpose: String,
    pub message: String,
}

impl FormDraft {
    pub fn has_data(&self) -> bool {
        FormField::ALL.iter().any(|f| !self.get(*f).is_empty())
    }

    pub fn get(&self, field: FormField) -> &str {
        match field {
            FormField::Name => &self.name,
            FormField::Email => &self.email,
            FormField::Phone => &self.phone,
            FormField::ModelInterest => &self.model_interest,
            FormField::Purpose => &self.purpose,
            FormField::Message => &self.message,
        }
    }

    fn slot(&mut self, field: FormField) -> &mut String {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::ModelInterest => &mut self.model_interest,
            FormField::Purpose => &mut self.purpose,
            FormField::Message => &mut self.message,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DraftPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub model_interest: Option<String>,
    pub purpose: Option<String>,
    pub message: Option<String>,
}

impl DraftPatch {
    pub fn field(field: FormField, value: impl Into<String>) -> Self {
        let mut patch = Self::default();
        *patch.slot(field) = Some(value.into());
        patch
    }

    fn slot(&mut self, field: FormField) -> &mut Option<String> {
        match field {
            FormField::Name => &mut self.name,
            FormField::Email => &mut self.email,
            FormField::Phone => &mut self.phone,
            FormField::ModelInterest => &mut self.model_interest,
            FormField::Purpose => &mut self.purpose,
            FormField::Message => &mut self.message,
        }
    }

    fn into_fields(self) -> Vec<(FormField, String)> {
        let Self { name, email, phone, model_interest, purpose, message } = self;
        [
            (FormField::Name, name),
            (FormField::Email, email),
            (FormField::Phone, phone),
            (FormField::ModelInterest, model_interest),
            (FormField::Purpose, purpose),
            (FormField::Message, message),
        ]
        .into_iter()
        .filter_map(|(f, v)| v.map(|v| (f, v)))
        .collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutosaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Selection {
    pub filter: CategoryFilter,
    pub sort: SortOrder,
    pub expanded_card: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShowroomState {
    pub compare_list: Vec<String>,
    pub saved_models: Vec<String>,
    pub selection: Selection,
    pub form: FormDraft,
    pub form_errors: FieldErrors,
    pub submitting: bool,
    pub submit_success: bool,
    pub autosave: AutosaveStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddToCompare(String),
    RemoveFromCompare(String),
    ClearCompare,
    ToggleSaved(String),
    SetFilter(CategoryFilter),
    SetSort(SortOrder),
    SetExpanded(Option<String>),
    UpdateDraft(DraftPatch),
    SetFormErrors(FieldErrors),
    ClearFormErrors(Option<FormField>),
    SetSubmitting(bool),
    SetSubmitSuccess(bool),
    ResetForm,
    SetAutosave(AutosaveStatus),
}

/// Which persisted slices a reduce touched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Changes {
    pub compare: bool,
    pub saved: bool,
    pub draft: bool,
    pub draft_cleared: bool,
}

pub fn reduce(state: &mut ShowroomState, action: Action) -> Changes {
    let mut changes = Changes::default();

    match action {
        Action::AddToCompare(id) => {
            if !state.compare_list.contains(&id) && state.compare_list.len() < MAX_COMPARE {
                state.compare_list.push(id);
                changes.compare = true;
            }
        }
        Action::RemoveFromCompare(id) => {
            let before = state.compare_list.len();
            state.compare_list.retain(|c| *c != id);
            changes.compare = state.compare_list.len() != before;
        }
        Action::ClearCompare => {
            changes.compare = !state.compare_list.is_empty();
            state.compare_list.clear();
        }
        Action::ToggleSaved(id) => {
            if let Some(pos) = state.saved_models.iter().position(|s| *s == id) {
                state.saved_models.remove(pos);
            } else {
                state.saved_models.push(id);
            }
            changes.saved = true;
        }
        Action::SetFilter(filter) => state.selection.filter = filter,
        Action::SetSort(sort) => state.selection.sort = sort,
        Action::SetExpanded(card) => state.selection.expanded_card = card,
        Action::UpdateDraft(patch) => {
            for (field, value) in patch.into_fields() {
                let value = if field == FormField::Phone {
                    validation::format_phone(&value)
                } else {
                    value
                };
                match validation::live_error(field, &value) {
                    Some(message) => {
                        state
                            .form_errors
                            .insert(field.key().to_string(), message.to_string());
                    }
                    None => {
                        state.form_errors.remove(field.key());
                    }
                }
                *state.form.slot(field) = value;
                changes.draft = true;
            }
        }
        Action::SetFormErrors(errors) => state.form_errors.extend(errors),
        Action::ClearFormErrors(Some(field)) => {
            state.form_errors.remove(field.key());
        }
        Action::ClearFormErrors(None) => state.form_errors.clear(),
        Action::SetSubmitting(flag) => state.submitting = flag,
        Action::SetSubmitSuccess(flag) => state.submit_success = flag,
        Action::ResetForm => {
            state.form = FormDraft::default();
            state.form_errors.clear();
            state.submitting = false;
            state.submit_success = false;
            state.autosave = AutosaveStatus::Idle;
            changes.draft_cleared = true;
        }
        Action::SetAutosave(status) => state.autosave = status,
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use ivm_core::Category;

    fn ids(state: &ShowroomState) -> Vec<&str> {
        state.compare_list.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_compare_capacity() {
        let mut state = ShowroomState::default();
        for id in ["g80", "g40", "g5t"] {
            assert!(reduce(&mut state, Action::AddToCompare(id.into())).compare);
        }
        let changes = reduce(&mut state, Action::AddToCompare("g90".into()));
        assert!(!changes.compare);
        assert_eq!(ids(&state), vec!["g80", "g40", "g5t"]);
    }

    #[test]
    fn test_compare_rejects_duplicates() {
        let mut state = ShowroomState::default();
        reduce(&mut state, Action::AddToCompare("g80".into()));
        assert!(!reduce(&mut state, Action::AddToCompare("g80".into())).compare);
        assert_eq!(ids(&state), vec!["g80"]);
    }

    #[test]
    fn test_compare_invariant_over_mixed_sequence() {
        let mut state = ShowroomState::default();
        let script = [
            Action::AddToCompare("a".into()),
            Action::AddToCompare("b".into()),
            Action::RemoveFromCompare("a".into()),
            Action::AddToCompare("c".into()),
            Action::AddToCompare("d".into()),
            Action::AddToCompare("e".into()),
            Action::AddToCompare("b".into()),
            Action::RemoveFromCompare("zz".into()),
            Action::RemoveFromCompare("c".into()),
            Action::AddToCompare("f".into()),
            Action::AddToCompare("g".into()),
        ];
        for action in script {
            reduce(&mut state, action);
            assert!(state.compare_list.len() <= MAX_COMPARE);
            let mut sorted = state.compare_list.clone();
            sorted.sort();
            sorted.dedup();
            assert_eq!(sorted.len(), state.compare_list.len());
        }
        assert_eq!(ids(&state), vec!["b", "d", "f"]);

        assert!(reduce(&mut state, Action::ClearCompare).compare);
        assert!(!reduce(&mut state, Action::ClearCompare).compare);
    }

    #[test]
    fn test_toggle_saved() {
        let mut state = ShowroomState::default();
        reduce(&mut state, Action::ToggleSaved("g40".into()));
        reduce(&mut state, Action::ToggleSaved("g80".into()));
        assert_eq!(state.saved_models, vec!["g40", "g80"]);
        reduce(&mut state, Action::ToggleSaved("g40".into()));
        assert_eq!(state.saved_models, vec!["g80"]);
    }

    #[test]
    fn test_selection_does_not_persist() {
        let mut state = ShowroomState::default();
        let changes = reduce(
            &mut state,
            Action::SetFilter(CategoryFilter::Only(Category::Crossover)),
        );
        assert_eq!(changes, Changes::default());
        reduce(&mut state, Action::SetSort(SortOrder::Price));
        reduce(&mut state, Action::SetExpanded(Some("g5t".into())));
        assert_eq!(state.selection.sort, SortOrder::Price);
        assert_eq!(state.selection.expanded_card.as_deref(), Some("g5t"));
    }

    #[test]
    fn test_update_draft_formats_and_validates_live() {
        let mut state = ShowroomState::default();
        let changes = reduce(
            &mut state,
            Action::UpdateDraft(DraftPatch::field(FormField::Phone, "0801234")),
        );
        assert!(changes.draft);
        assert_eq!(state.form.phone, "080 123 4");
        assert!(state.form_errors.contains_key("phone"));

        reduce(
            &mut state,
            Action::UpdateDraft(DraftPatch::field(FormField::Phone, "08012345678")),
        );
        assert_eq!(state.form.phone, "080 123 4567");
        assert!(!state.form_errors.contains_key("phone"));

        reduce(
            &mut state,
            Action::UpdateDraft(DraftPatch {
                name: Some("Chidi".into()),
                email: Some("chidi@".into()),
                ..DraftPatch::default()
            }),
        );
        assert_eq!(state.form.name, "Chidi");
        assert_eq!(state.form_errors.len(), 1);
        assert!(state.form_errors.contains_key("email"));
    }

    #[test]
    fn test_reset_form() {
        let mut state = ShowroomState::default();
        reduce(&mut state, Action::UpdateDraft(DraftPatch::field(FormField::Message, "hi")));
        reduce(&mut state, Action::SetSubmitting(true));
        reduce(&mut state, Action::SetAutosave(AutosaveStatus::Saved));
        let changes = reduce(&mut state, Action::ResetForm);
        assert!(changes.draft_cleared);
        assert!(!state.form.has_data());
        assert!(!state.submitting);
        assert_eq!(state.autosave, AutosaveStatus::Idle);
    }

    #[test]
    fn test_form_errors_merge_and_clear() {
        let mut state = ShowroomState::default();
        reduce(
            &mut state,
            Action::SetFormErrors(FieldErrors::from([("name".into(), "required".into())])),
        );
        reduce(
            &mut state,
            Action::SetFormErrors(FieldErrors::from([("email".into(), "bad".into())])),
        );
        assert_eq!(state.form_errors.len(), 2);
        reduce(&mut state, Action::ClearFormErrors(Some(FormField::Name)));
        assert_eq!(state.form_errors.len(), 1);
        reduce(&mut state, Action::ClearFormErrors(None));
        assert!(state.form_errors.is_empty());
    }

    #[test]
    fn test_draft_wire_format() {
        let draft: FormDraft = serde_json::from_str(
            r#"{"name":"Ada","modelInterest":"INNOSON G40","purpose":"Purchase"}"#,
        )
        .unwrap();
        assert_eq!(draft.model_interest, "INNOSON G40");
        assert!(draft.email.is_empty());
        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["modelInterest"], "INNOSON G40");
    }
}
