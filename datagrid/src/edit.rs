//! Cell edit state machine.
//!
//! ```text
//! Idle --begin--> Editing --begin_commit--> Committing --finish_commit--> Idle
//!                    |                          |
//!                    +--------cancel------------+--> Idle
//! ```
//!
//! Only one session exists at a time. Beginning a new session while one is
//! open cancels the open one. The controller never touches the store; the
//! grid applies the [`CommitOutcome`] it returns.

use log::debug;

use crate::record::RecordId;

/// Controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditState {
    #[default]
    Idle,
    Editing,
    Committing,
}

/// Status of an open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStatus {
    Editing,
    Committing,
}

/// The cell a session edits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditTarget {
    /// Position in the derived view.
    pub row: usize,
    /// Record being edited, stable across view recomputation.
    pub record: RecordId,
    /// Column ordinal.
    pub column: usize,
    /// Column name, reported in change events.
    pub column_name: String,
}

/// An in-progress edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    pub target: EditTarget,
    /// Cell value when the session opened.
    pub original: String,
    /// Current editor text.
    pub draft: String,
    pub status: EditStatus,
}

impl EditSession {
    /// Whether the draft differs from the original value.
    pub fn is_dirty(&self) -> bool {
        self.draft != self.original
    }
}

/// A committed edit that must be written back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitOutcome {
    pub target: EditTarget,
    pub old_value: String,
    pub new_value: String,
}

/// Coordinates double-activate, edit, commit and cancel.
#[derive(Debug, Clone, Default)]
pub struct CellEditController {
    session: Option<EditSession>,
}

impl CellEditController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> EditState {
        match self.session.as_ref().map(|s| s.status) {
            None => EditState::Idle,
            Some(EditStatus::Editing) => EditState::Editing,
            Some(EditStatus::Committing) => EditState::Committing,
        }
    }

    pub fn session(&self) -> Option<&EditSession> {
        self.session.as_ref()
    }

    /// Open a session on `target`. An already open session is cancelled and
    /// returned; its draft is discarded.
    pub fn begin(&mut self, target: EditTarget, original: String) -> Option<EditSession> {
        let cancelled = self.cancel();
        debug!(
            "Editing row {} column '{}'",
            target.row, target.column_name
        );
        self.session = Some(EditSession {
            target,
            draft: original.clone(),
            original,
            status: EditStatus::Editing,
        });
        cancelled
    }

    /// Replace the draft text. Returns false when no session is editing.
    pub fn set_draft(&mut self, text: impl Into<String>) -> bool {
        match self.session.as_mut() {
            Some(session) if session.status == EditStatus::Editing => {
                session.draft = text.into();
                true
            }
            _ => false,
        }
    }

    /// Editing -> Committing with the final draft. Returns false when no
    /// session is editing.
    pub fn begin_commit(&mut self, draft: impl Into<String>) -> bool {
        match self.session.as_mut() {
            Some(session) if session.status == EditStatus::Editing => {
                session.draft = draft.into();
                session.status = EditStatus::Committing;
                true
            }
            _ => false,
        }
    }

    /// Committing -> Idle. Returns the write to apply, or `None` when the
    /// draft equals the original value (or nothing was committing).
    pub fn finish_commit(&mut self) -> Option<CommitOutcome> {
        if self.state() != EditState::Committing {
            return None;
        }
        let session = self.session.take()?;
        if !session.is_dirty() {
            debug!("Edit of row {} unchanged", session.target.row);
            return None;
        }
        Some(CommitOutcome {
            target: session.target,
            old_value: session.original,
            new_value: session.draft,
        })
    }

    /// Drop the open session without writing.
    pub fn cancel(&mut self) -> Option<EditSession> {
        let session = self.session.take();
        if let Some(ref s) = session {
            debug!("Cancelled edit of row {}", s.target.row);
        }
        session
    }

    /// Point the open session at a new derived row.
    pub fn retarget(&mut self, row: usize) {
        if let Some(session) = self.session.as_mut() {
            session.target.row = row;
        }
    }
}
