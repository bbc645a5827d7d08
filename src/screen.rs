//! One management view: session check on mount, the collection's list state,
//! its editor, and the last notification shown to the user.

use std::sync::Arc;

use crate::config;
use crate::editor::{EditorMode, RecordEditor, SubmitOutcome};
use crate::error::AdminError;
use crate::gateway::{fetch_record, fetch_records, Gateway, GatewayError};
use crate::listing::{ListController, ListOptions, ListView};
use crate::model::{Collection, Record};
use crate::session::{SessionGuard, ENTRY_ROUTE};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Ready,
    Redirect { route: &'static str },
}

/// List options for a collection with configured overrides applied
pub fn list_options(collection: Collection) -> ListOptions<Record> {
    let listing = &config::config().listing;
    let page_size = listing.page_size_override.unwrap_or_else(|| collection.page_size());
    ListOptions::new(collection.searchable_fields(), page_size)
        .with_window(listing.page_window)
        .with_order(collection.default_order())
}

pub struct Screen<G: Gateway + ?Sized> {
    collection: Collection,
    gateway: Arc<G>,
    list: ListController<Record>,
    editor: RecordEditor,
    notification: Option<Notification>,
}

impl<G: Gateway + ?Sized> Screen<G> {
    pub fn new(collection: Collection, gateway: Arc<G>) -> Self {
        Self::with_options(collection, gateway, list_options(collection))
    }

    pub fn with_options(collection: Collection, gateway: Arc<G>, options: ListOptions<Record>) -> Self {
        Self {
            collection,
            gateway,
            list: ListController::new(options),
            editor: RecordEditor::new(collection),
            notification: None,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn list(&self) -> &ListController<Record> {
        &self.list
    }

    pub fn editor(&self) -> &RecordEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut RecordEditor {
        &mut self.editor
    }

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Check the session, then load the collection. An anonymous user is sent
    /// to the entry route without any fetch.
    pub async fn mount(&mut self, guard: &SessionGuard) -> MountOutcome {
        if !guard.is_authenticated() {
            tracing::debug!("No session for {}, redirecting to {}", self.collection, ENTRY_ROUTE);
            return MountOutcome::Redirect { route: ENTRY_ROUTE };
        }
        // A failed load is already reported through the notification
        let _ = self.refresh().await;
        MountOutcome::Ready
    }

    /// Re-fetch the whole collection; the list returns to page 1
    pub async fn refresh(&mut self) -> Result<(), AdminError> {
        if let Err(e) = self.reload().await {
            self.notification = Some(Notification::error(format!(
                "Could not load {}: {}",
                self.collection.label(),
                e
            )));
            return Err(e.into());
        }
        Ok(())
    }

    async fn reload(&mut self) -> Result<(), GatewayError> {
        match fetch_records(self.gateway.as_ref(), self.collection).await {
            Ok(records) => {
                self.list.set_records(records);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Loading {} failed: {}", self.collection, e);
                Err(e)
            }
        }
    }

    /// Report a completed save, then re-fetch. A failed re-fetch is appended
    /// to the success message rather than replacing it.
    async fn saved(&mut self, verb: &str) {
        let label = self.collection.label();
        let message = match self.reload().await {
            Ok(()) => format!("{} record {}", label, verb),
            Err(e) => format!("{} record {}; list could not be reloaded: {}", label, verb, e),
        };
        self.notification = Some(Notification::success(message));
    }

    pub fn search(&mut self, term: impl Into<String>) {
        self.list.set_search_term(term);
    }

    pub fn go_to_page(&mut self, page: usize) -> usize {
        self.list.set_page(page)
    }

    pub fn view(&self) -> ListView<'_, Record> {
        self.list.view()
    }

    pub fn open_create(&mut self) -> Result<(), AdminError> {
        self.editor.open(None)?;
        Ok(())
    }

    /// Open the editor on a loaded record, fetching it when it is not in the list
    pub async fn open_edit(&mut self, id: &str) -> Result<(), AdminError> {
        let record = match self.list.records().iter().find(|r| r.id() == id) {
            Some(record) => record.clone(),
            None => fetch_record(self.gateway.as_ref(), self.collection, id).await?,
        };
        self.editor.open(Some(&record))?;
        Ok(())
    }

    /// Submit the editor; on success notify and re-fetch
    pub async fn submit_editor(&mut self) -> Result<SubmitOutcome, AdminError> {
        match self.editor.submit(self.gateway.as_ref()).await {
            Ok(outcome) => {
                let verb = match outcome.mode {
                    EditorMode::Create => "created",
                    EditorMode::Edit { .. } => "updated",
                };
                self.saved(verb).await;
                Ok(outcome)
            }
            Err(e) => {
                self.notification = Some(Notification::error(e.message()));
                Err(e)
            }
        }
    }

    pub fn request_delete(&mut self, id: &str) -> Result<(), AdminError> {
        self.editor.request_delete(id)?;
        Ok(())
    }

    pub fn cancel(&mut self) {
        self.editor.cancel();
    }

    pub async fn confirm_delete(&mut self) -> Result<String, AdminError> {
        match self.editor.confirm_delete(self.gateway.as_ref()).await {
            Ok(id) => {
                self.saved("deleted").await;
                Ok(id)
            }
            Err(e) => {
                self.notification = Some(Notification::error(e.message()));
                Err(e)
            }
        }
    }
}
