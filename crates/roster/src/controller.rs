//! View controller for roster front ends.
//!
//! The controller is a small state machine between user intent and the
//! [`RecordStore`]. It starts in [`Mode::View`] and never terminates:
//!
//! ```text
//! View --Add-------------> Add
//! View --Edit(i)---------> Edit { id, index }
//! Add  --Submit (valid)--> View      store.add
//! Edit --Submit (valid)--> View      store.update(id)
//! Add | Edit --Cancel----> View      form discarded
//! View --Delete(i)-------> View      store.remove(i)
//! View --Refresh---------> View      store.load
//! ```
//!
//! A failed submit (validation or backend) keeps the current mode and the
//! submitted form so the user can correct it and try again.

use std::fmt;

use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::record::{Candidate, Record, RecordId, RecordRef};
use crate::store::RecordStore;
use crate::validate::{validate, FieldErrors};

/// Controller mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Showing the record table.
    #[default]
    View,
    /// Filling in a new record.
    Add,
    /// Editing an existing record.
    Edit {
        /// Identifier of the record being edited.
        id: RecordId,
        /// Row the edit was started from.
        index: usize,
    },
}

impl Mode {
    /// Short lowercase name of the mode.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Add => "add",
            Self::Edit { .. } => "edit",
        }
    }

    /// Whether a form is open.
    #[must_use]
    pub fn is_form(&self) -> bool {
        !matches!(self, Self::View)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A user action forwarded by the front end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    /// Open an empty add form.
    Add,
    /// Open the edit form for a row.
    Edit(usize),
    /// Delete a row.
    Delete(usize),
    /// Submit the open form with these values.
    Submit(Candidate),
    /// Close the open form without saving.
    Cancel,
    /// Reload records from the backend.
    Refresh,
}

impl Intent {
    /// Short lowercase name of the intent.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit(_) => "edit",
            Self::Delete(_) => "delete",
            Self::Submit(_) => "submit",
            Self::Cancel => "cancel",
            Self::Refresh => "refresh",
        }
    }
}

/// Mediates between user intent, the validator and the store.
#[derive(Debug)]
pub struct ViewController {
    store: RecordStore,
    mode: Mode,
    form: Candidate,
    field_errors: FieldErrors,
}

impl ViewController {
    /// Create a controller in view mode over a store.
    #[must_use]
    pub fn new(store: RecordStore) -> Self {
        Self {
            store,
            mode: Mode::View,
            form: Candidate::default(),
            field_errors: FieldErrors::new(),
        }
    }

    /// Current mode.
    #[must_use]
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Current form values (initial values when a form was just opened).
    #[must_use]
    pub fn form(&self) -> &Candidate {
        &self.form
    }

    /// Field errors from the last rejected submit.
    #[must_use]
    pub fn field_errors(&self) -> &FieldErrors {
        &self.field_errors
    }

    /// Records to render.
    #[must_use]
    pub fn records(&self) -> &[Record] {
        self.store.list()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Hand the store back, dropping UI state.
    #[must_use]
    pub fn into_store(self) -> RecordStore {
        self.store
    }

    /// Apply a user intent.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidTransition`] if the current mode does not accept the
    ///   intent; nothing changes.
    /// - [`Error::NotFound`] if a row index does not resolve; nothing changes.
    /// - [`Error::Validation`] if a submitted form fails validation; the mode
    ///   and submitted values are kept and [`Self::field_errors`] is set.
    /// - Any backend error from the store; the mode and form are kept.
    pub async fn handle(&mut self, intent: Intent) -> Result<()> {
        debug!(mode = %self.mode, intent = intent.name(), "Handling intent");

        match (self.mode.is_form(), intent) {
            (false, Intent::Add) => {
                self.open_form(Mode::Add, Candidate::default());
                Ok(())
            }
            (false, Intent::Edit(index)) => {
                let record = self.store.get(&RecordRef::Index(index))?;
                let (id, form) = (record.id.clone(), Candidate::from(record));
                self.open_form(Mode::Edit { id, index }, form);
                Ok(())
            }
            (false, Intent::Delete(index)) => {
                let removed = self.store.remove(&RecordRef::Index(index)).await?;
                info!(id = %removed.id, "Deleted record");
                Ok(())
            }
            (false, Intent::Refresh) => self.store.load().await,
            (true, Intent::Submit(candidate)) => self.submit(candidate).await,
            (true, Intent::Cancel) => {
                self.close_form();
                Ok(())
            }
            (_, intent) => Err(Error::InvalidTransition {
                state: self.mode.name(),
                intent: intent.name(),
            }),
        }
    }

    async fn submit(&mut self, candidate: Candidate) -> Result<()> {
        let data = match validate(&candidate) {
            Ok(data) => data,
            Err(errors) => {
                self.form = candidate;
                self.field_errors = errors.clone();
                return Err(Error::Validation(errors));
            }
        };

        let result = match &self.mode {
            Mode::Add => self.store.add(data).await,
            Mode::Edit { id, .. } => {
                let target = RecordRef::Id(id.clone());
                self.store.update(&target, data).await
            }
            Mode::View => {
                return Err(Error::internal("submit reached view mode"));
            }
        };

        match result {
            Ok(record) => {
                info!(id = %record.id, mode = %self.mode, "Saved record");
                self.close_form();
                Ok(())
            }
            Err(e) => {
                self.form = candidate;
                self.field_errors = FieldErrors::new();
                Err(e)
            }
        }
    }

    fn open_form(&mut self, mode: Mode, form: Candidate) {
        self.mode = mode;
        self.form = form;
        self.field_errors = FieldErrors::new();
    }

    fn close_form(&mut self) {
        self.open_form(Mode::View, Candidate::default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryBackend;
    use crate::validate::Field;

    fn controller() -> ViewController {
        ViewController::new(RecordStore::new(Box::new(MemoryBackend::new())))
    }

    async fn controller_with(names: &[&str]) -> ViewController {
        let mut ctl = controller();
        for name in names {
            ctl.handle(Intent::Add).await.unwrap();
            ctl.handle(Intent::Submit(Candidate::new(
                *name,
                format!("{}@x.com", name.to_lowercase()),
                "20",
            )))
            .await
            .unwrap();
        }
        ctl
    }

    #[tokio::test]
    async fn test_initial_state() {
        let ctl = controller();
        assert_eq!(ctl.mode(), &Mode::View);
        assert!(ctl.records().is_empty());
        assert_eq!(ctl.form(), &Candidate::default());
    }

    #[tokio::test]
    async fn test_add_flow() {
        let mut ctl = controller();

        ctl.handle(Intent::Add).await.unwrap();
        assert_eq!(ctl.mode(), &Mode::Add);
        assert!(ctl.mode().is_form());

        ctl.handle(Intent::Submit(Candidate::new("Ann", "ann@x.com", "30")))
            .await
            .unwrap();
        assert_eq!(ctl.mode(), &Mode::View);
        assert_eq!(ctl.records().len(), 1);
        assert_eq!(ctl.records()[0].name, "Ann");
    }

    #[tokio::test]
    async fn test_edit_captures_row_values() {
        let mut ctl = controller_with(&["Ann", "Bo"]).await;
        let bo_id = ctl.records()[1].id.clone();

        ctl.handle(Intent::Edit(1)).await.unwrap();

        assert_eq!(
            ctl.mode(),
            &Mode::Edit {
                id: bo_id,
                index: 1
            }
        );
        assert_eq!(ctl.form(), &Candidate::new("Bo", "bo@x.com", "20"));
    }

    #[tokio::test]
    async fn test_edit_submit_updates_same_record() {
        let mut ctl = controller_with(&["Ann", "Bo"]).await;
        let ann_id = ctl.records()[0].id.clone();

        ctl.handle(Intent::Edit(0)).await.unwrap();
        ctl.handle(Intent::Submit(Candidate::new("Ann B", "ann@x.com", "31")))
            .await
            .unwrap();

        assert_eq!(ctl.mode(), &Mode::View);
        assert_eq!(ctl.records()[0].id, ann_id);
        assert_eq!(ctl.records()[0].name, "Ann B");
        assert_eq!(ctl.records()[1].name, "Bo");
    }

    #[tokio::test]
    async fn test_edit_out_of_range_is_not_found() {
        let mut ctl = controller_with(&["Ann"]).await;

        let err = ctl.handle(Intent::Edit(3)).await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(ctl.mode(), &Mode::View);
    }

    #[tokio::test]
    async fn test_cancel_discards_form() {
        let mut ctl = controller_with(&["Ann"]).await;

        ctl.handle(Intent::Edit(0)).await.unwrap();
        ctl.handle(Intent::Cancel).await.unwrap();

        assert_eq!(ctl.mode(), &Mode::View);
        assert_eq!(ctl.form(), &Candidate::default());
        assert_eq!(ctl.records()[0].name, "Ann");

        ctl.handle(Intent::Add).await.unwrap();
        ctl.handle(Intent::Cancel).await.unwrap();
        assert_eq!(ctl.records().len(), 1);
    }

    #[tokio::test]
    async fn test_invalid_submit_stays_in_form() {
        let mut ctl = controller();
        ctl.handle(Intent::Add).await.unwrap();

        let bad = Candidate::new("", "nope", "0");
        let err = ctl.handle(Intent::Submit(bad.clone())).await.unwrap_err();

        assert!(err.is_validation());
        assert_eq!(ctl.mode(), &Mode::Add);
        assert_eq!(ctl.form(), &bad);
        assert_eq!(ctl.field_errors().len(), 3);
        assert!(ctl.field_errors().contains(Field::Age));
        assert!(ctl.records().is_empty());

        ctl.handle(Intent::Submit(Candidate::new("Ann", "ann@x.com", "30")))
            .await
            .unwrap();
        assert!(ctl.field_errors().is_empty());
        assert_eq!(ctl.records().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_in_view() {
        let mut ctl = controller_with(&["Ann", "Bo"]).await;

        ctl.handle(Intent::Delete(0)).await.unwrap();

        assert_eq!(ctl.mode(), &Mode::View);
        assert_eq!(ctl.records().len(), 1);
        assert_eq!(ctl.records()[0].name, "Bo");
    }

    #[tokio::test]
    async fn test_rejected_transitions() {
        let mut ctl = controller();

        let err = ctl
            .handle(Intent::Submit(Candidate::default()))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidTransition {
                state: "view",
                intent: "submit"
            }
        ));
        assert!(ctl.handle(Intent::Cancel).await.is_err());

        ctl.handle(Intent::Add).await.unwrap();
        for intent in [Intent::Add, Intent::Edit(0), Intent::Delete(0), Intent::Refresh] {
            let err = ctl.handle(intent).await.unwrap_err();
            assert!(matches!(err, Error::InvalidTransition { state: "add", .. }));
        }
        assert_eq!(ctl.mode(), &Mode::Add);
    }

    #[tokio::test]
    async fn test_refresh_reloads_store() {
        let mut ctl = controller_with(&["Ann"]).await;
        ctl.handle(Intent::Refresh).await.unwrap();
        assert_eq!(ctl.records().len(), 1);
    }

    #[test]
    fn test_mode_display() {
        assert_eq!(Mode::View.to_string(), "view");
        assert_eq!(Mode::Add.to_string(), "add");
        let edit = Mode::Edit {
            id: RecordId::new("x"),
            index: 0,
        };
        assert_eq!(edit.to_string(), "edit");
    }
}
