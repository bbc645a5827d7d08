//! Draft state for creating, editing and deleting one collection's records.
//!
//! ```text
//! Closed -> Open(create|edit) -> Submitting -> Closed          (success)
//!                                           -> Open + error    (failure)
//! Closed -> ConfirmingDelete -> Closed                         (success)
//!                            -> Closed + error                 (failure)
//! ```

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::AdminError;
use crate::gateway::Gateway;
use crate::model::collection::{USER_EMAIL_FIELD, USER_NAME_FIELD};
use crate::model::{Collection, Record};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditorError {
    #[error("The editor is not open")]
    NotOpen,

    #[error("A submission is already in progress")]
    Busy,

    #[error("Close the current form before starting another action")]
    AlreadyOpen,

    #[error("No deletion is waiting for confirmation")]
    NotConfirming,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorState {
    Closed,
    Open { mode: EditorMode },
    Submitting { mode: EditorMode },
    ConfirmingDelete { id: String },
}

/// What a successful submit did
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub mode: EditorMode,
    /// Id of the stored record when the store reported one
    pub id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordEditor {
    collection: Collection,
    state: EditorState,
    draft: Map<String, Value>,
    /// Draft as first seeded; edits send only the fields that differ from it
    original: Map<String, Value>,
    error: Option<String>,
}

impl RecordEditor {
    pub fn new(collection: Collection) -> Self {
        Self {
            collection,
            state: EditorState::Closed,
            draft: Map::new(),
            original: Map::new(),
            error: None,
        }
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn draft(&self) -> &Map<String, Value> {
        &self.draft
    }

    /// Message from the last failed submit or delete
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, EditorState::Open { .. })
    }

    /// Seed the draft from `record` (edit) or from blank defaults (create)
    pub fn open(&mut self, record: Option<&Record>) -> Result<(), EditorError> {
        match self.state {
            EditorState::Closed => {}
            EditorState::Submitting { .. } => return Err(EditorError::Busy),
            _ => return Err(EditorError::AlreadyOpen),
        }

        let (mode, draft) = match record {
            Some(record) => {
                let mut draft = record.to_draft();
                // Joined user details are display-only
                draft.remove(USER_NAME_FIELD);
                draft.remove(USER_EMAIL_FIELD);
                (EditorMode::Edit { id: record.id().to_string() }, draft)
            }
            None => (EditorMode::Create, self.blank_draft()),
        };

        self.state = EditorState::Open { mode };
        self.original = draft.clone();
        self.draft = draft;
        self.error = None;
        Ok(())
    }

    fn blank_draft(&self) -> Map<String, Value> {
        self.collection
            .schema()
            .fields()
            .iter()
            .filter(|f| f.required)
            .map(|f| (f.name.to_string(), Value::String(String::new())))
            .collect()
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.draft.insert(name.into(), value.into());
        Ok(())
    }

    /// Merge several fields into the draft
    pub fn apply(&mut self, fields: Map<String, Value>) -> Result<(), EditorError> {
        self.ensure_open()?;
        self.draft.extend(fields);
        Ok(())
    }

    fn ensure_open(&self) -> Result<(), EditorError> {
        match self.state {
            EditorState::Open { .. } => Ok(()),
            EditorState::Submitting { .. } => Err(EditorError::Busy),
            _ => Err(EditorError::NotOpen),
        }
    }

    /// Validate and send the draft. A validation failure never reaches the
    /// gateway; any failure leaves the form open with the message shown.
    pub async fn submit<G>(&mut self, gateway: &G) -> Result<SubmitOutcome, AdminError>
    where
        G: Gateway + ?Sized,
    {
        let mode = match &self.state {
            EditorState::Open { mode } => mode.clone(),
            EditorState::Submitting { .. } => return Err(EditorError::Busy.into()),
            _ => return Err(EditorError::NotOpen.into()),
        };

        let payload = match self.collection.schema().validate_draft(&self.draft) {
            Ok(payload) => payload,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.into());
            }
        };

        // Untouched fields stay exactly as the store holds them
        let payload = match &mode {
            EditorMode::Create => payload,
            EditorMode::Edit { .. } => payload
                .into_iter()
                .filter(|(key, _)| self.draft.get(key) != self.original.get(key))
                .collect(),
        };

        self.state = EditorState::Submitting { mode: mode.clone() };
        self.error = None;

        let result = match &mode {
            EditorMode::Create => gateway.create(self.collection, payload).await,
            EditorMode::Edit { id } => gateway.update(self.collection, id, payload).await,
        };

        match result {
            Ok(doc) => {
                let id = doc
                    .get("id")
                    .and_then(Value::as_str)
                    .map(str::to_string)
                    .or_else(|| match &mode {
                        EditorMode::Edit { id } => Some(id.clone()),
                        EditorMode::Create => None,
                    });
                self.close();
                Ok(SubmitOutcome { mode, id })
            }
            Err(e) => {
                tracing::warn!("Saving {} record failed: {}", self.collection, e);
                self.error = Some(e.to_string());
                self.state = EditorState::Open { mode };
                Err(e.into())
            }
        }
    }

    /// Discard the draft unconditionally
    pub fn cancel(&mut self) {
        self.close();
    }

    pub fn close(&mut self) {
        self.state = EditorState::Closed;
        self.draft.clear();
        self.original.clear();
        self.error = None;
    }

    /// First step of deletion: remember what to delete and wait for confirmation
    pub fn request_delete(&mut self, id: impl Into<String>) -> Result<(), EditorError> {
        match self.state {
            EditorState::Closed => {}
            EditorState::Submitting { .. } => return Err(EditorError::Busy),
            _ => return Err(EditorError::AlreadyOpen),
        }
        self.state = EditorState::ConfirmingDelete { id: id.into() };
        self.error = None;
        Ok(())
    }

    /// Second step of deletion. The editor closes whether or not the call succeeds.
    pub async fn confirm_delete<G>(&mut self, gateway: &G) -> Result<String, AdminError>
    where
        G: Gateway + ?Sized,
    {
        let id = match &self.state {
            EditorState::ConfirmingDelete { id } => id.clone(),
            _ => return Err(EditorError::NotConfirming.into()),
        };

        let result = gateway.delete(self.collection, &id).await;
        self.close();

        match result {
            Ok(()) => Ok(id),
            Err(e) => {
                tracing::warn!("Deleting {} record {} failed: {}", self.collection, id, e);
                self.error = Some(e.to_string());
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::MemoryGateway;
    use crate::types::Operation;
    use serde_json::json;

    fn tip_record() -> Record {
        Collection::Tips
            .schema()
            .parse(json!({ "id": "t1", "title": "Walk", "content": "Ten minutes outside", "category": "movement" }))
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_flow() {
        let gateway = MemoryGateway::new();
        let mut editor = RecordEditor::new(Collection::Tips);

        editor.open(None).unwrap();
        assert_eq!(editor.draft().get("title"), Some(&json!("")));
        editor.set_field("title", "Hydrate").unwrap();
        editor.set_field("content", "Drink a glass of water").unwrap();
        editor.set_field("category", "body").unwrap();

        let outcome = editor.submit(&gateway).await.unwrap();
        assert_eq!(outcome.mode, EditorMode::Create);
        assert!(outcome.id.is_some());
        assert_eq!(editor.state(), &EditorState::Closed);
        assert!(editor.draft().is_empty());
        assert_eq!(gateway.count(Collection::Tips), 1);
    }

    #[tokio::test]
    async fn test_validation_failure_issues_no_call() {
        let gateway = MemoryGateway::new();
        let mut editor = RecordEditor::new(Collection::Tips);
        editor.open(None).unwrap();
        editor.set_field("title", "Only a title").unwrap();

        let err = editor.submit(&gateway).await.unwrap_err();
        assert!(matches!(err, AdminError::Validation(_)));
        assert!(editor.is_open());
        assert!(editor.error().unwrap().contains("content"));
        assert!(gateway.calls().is_empty());
    }

    #[tokio::test]
    async fn test_gateway_failure_keeps_form_open() {
        let gateway = MemoryGateway::new();
        gateway.seed(Collection::Tips, vec![tip_record().to_json()]);
        gateway.fail_next("permission denied");

        let mut editor = RecordEditor::new(Collection::Tips);
        editor.open(Some(&tip_record())).unwrap();
        editor.set_field("title", "Walk slowly").unwrap();

        let err = editor.submit(&gateway).await.unwrap_err();
        assert!(matches!(err, AdminError::Gateway(_)));
        assert_eq!(
            editor.state(),
            &EditorState::Open { mode: EditorMode::Edit { id: "t1".to_string() } }
        );
        assert!(editor.error().unwrap().contains("permission denied"));
        // Draft survives so the user can retry
        assert_eq!(editor.draft().get("title"), Some(&json!("Walk slowly")));

        let outcome = editor.submit(&gateway).await.unwrap();
        assert_eq!(outcome.id.as_deref(), Some("t1"));
        assert_eq!(gateway.calls().last(), Some(&(Operation::Update, Collection::Tips)));
    }

    #[tokio::test]
    async fn test_edit_sends_only_changed_fields() {
        let gateway = MemoryGateway::new();
        let stored = json!({
            "id": "t9",
            "title": "Walk",
            "content": "Ten minutes outside",
            "category": "movement",
            "createdAt": { "seconds": 1_700_000_000, "nanoseconds": 0 },
            "views": 3
        });
        gateway.seed(Collection::Tips, vec![stored.clone()]);
        let record = Collection::Tips.schema().parse(stored).unwrap();

        let mut editor = RecordEditor::new(Collection::Tips);
        editor.open(Some(&record)).unwrap();
        editor.set_field("title", "Walk slowly").unwrap();
        editor.submit(&gateway).await.unwrap();

        let doc = gateway.document(Collection::Tips, "t9").unwrap();
        assert_eq!(doc["title"], json!("Walk slowly"));
        assert_eq!(doc["createdAt"], json!({ "seconds": 1_700_000_000, "nanoseconds": 0 }));
        assert_eq!(doc["views"], json!(3));
        assert_eq!(doc["content"], json!("Ten minutes outside"));
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let gateway = MemoryGateway::new();
        gateway.seed(Collection::Tips, vec![tip_record().to_json()]);
        let mut editor = RecordEditor::new(Collection::Tips);

        assert!(matches!(
            editor.confirm_delete(&gateway).await,
            Err(AdminError::Editor(EditorError::NotConfirming))
        ));

        editor.request_delete("t1").unwrap();
        assert_eq!(editor.state(), &EditorState::ConfirmingDelete { id: "t1".to_string() });
        editor.cancel();
        assert_eq!(gateway.count(Collection::Tips), 1);

        editor.request_delete("t1").unwrap();
        assert_eq!(editor.confirm_delete(&gateway).await.unwrap(), "t1");
        assert_eq!(gateway.count(Collection::Tips), 0);
    }

    #[tokio::test]
    async fn test_failed_delete_closes_with_error() {
        let gateway = MemoryGateway::new();
        let mut editor = RecordEditor::new(Collection::Tips);
        editor.request_delete("missing").unwrap();

        assert!(editor.confirm_delete(&gateway).await.is_err());
        assert_eq!(editor.state(), &EditorState::Closed);
        assert!(editor.error().unwrap().contains("not found"));
    }

    #[test]
    fn test_invalid_transitions() {
        let mut editor = RecordEditor::new(Collection::Tips);
        assert_eq!(editor.set_field("title", "x"), Err(EditorError::NotOpen));

        editor.open(None).unwrap();
        assert_eq!(editor.open(None), Err(EditorError::AlreadyOpen));
        assert_eq!(editor.request_delete("t1"), Err(EditorError::AlreadyOpen));

        editor.state = EditorState::Submitting { mode: EditorMode::Create };
        assert_eq!(editor.set_field("title", "x"), Err(EditorError::Busy));
        assert_eq!(editor.open(None), Err(EditorError::Busy));
    }
}
