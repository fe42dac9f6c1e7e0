//! Error types for timetree.
//!
//! All errors are strongly typed using thiserror. The engine has very few
//! failure paths: it is a pure in-memory model, so errors only arise from
//! malformed construction, never from queries over well-formed state.

use thiserror::Error;

use crate::event::EventId;
use crate::subject::SubjectId;

/// Errors raised while building or querying a timeline.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimelineError {
    /// A subject id did not resolve in the timeline it was used with.
    ///
    /// Raised when an outcome or query names a subject outside the arena —
    /// construction fails fast before any history is mutated. Unresolvable
    /// *parent* ids encountered during upward traversal are not errors; they
    /// are treated as reaching the root.
    #[error("Unknown subject id: {id}")]
    UnknownSubject { id: SubjectId },

    #[error("Unknown event id: {id}")]
    UnknownEvent { id: EventId },

    #[error("Subject name cannot be empty")]
    EmptySubjectName,
}

impl TimelineError {
    /// Returns true if this error names a subject that did not resolve.
    #[must_use]
    pub const fn is_unknown_subject(&self) -> bool {
        matches!(self, Self::UnknownSubject { .. })
    }

    /// Returns true if this error names an event that did not resolve.
    #[must_use]
    pub const fn is_unknown_event(&self) -> bool {
        matches!(self, Self::UnknownEvent { .. })
    }
}

/// Result type alias for timetree operations.
pub type TimelineResult<T> = Result<T, TimelineError>;
