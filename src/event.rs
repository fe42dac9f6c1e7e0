//! Events and the outcomes they apply.
//!
//! An [`Event`] is an immutable timestamped occurrence. It is created once,
//! stored once in the timeline arena, and referenced by id from every history
//! it touched. An [`Outcome`] is a transient, single-use action bound to one
//! subject; the enclosing event consumes it exactly once at construction.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::subject::SubjectId;
use crate::value::Value;

/// Identifier of an event within a timeline's arena.
///
/// Ids are assigned in construction order, so ordering two event ids orders
/// the events by creation time — the tie-break used when several events share
/// a point.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct EventId(u32);

impl EventId {
    /// Creates an id from a raw arena index.
    #[must_use]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    /// Returns the raw arena index.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "event#{}", self.0)
    }
}

/// An immutable timestamped occurrence.
///
/// Events never change after construction. They do not own their outcomes;
/// outcomes are consumed during [`crate::EventBuilder::commit`] and discarded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event<P> {
    /// When the event happened.
    pub point: P,

    /// What happened, in prose.
    pub description: String,
}

impl<P> Event<P> {
    pub(crate) fn new(point: P, description: impl Into<String>) -> Self {
        Self {
            point,
            description: description.into(),
        }
    }
}

impl<P: fmt::Display> fmt::Display for Event<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.point, self.description)
    }
}

/// A deferred, single-use action bound to one subject.
///
/// Produced by the caller (or synthesized internally for pertains markers)
/// and executed exactly once when the enclosing event is committed. Not
/// retained afterwards.
///
/// # Examples
///
/// ```
/// use timetree::{Outcome, Timeline, Value};
///
/// let mut tl: Timeline<i64> = Timeline::new();
/// let lamp = tl.subject("lamp").unwrap();
/// tl.record(5, "Lamp switched on")
///     .outcome(Outcome::set(lamp, Value::Bool(true)))
///     .commit()
///     .unwrap();
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    /// Assign a value to the subject at the event's point.
    Set { subject: SubjectId, value: Value },

    /// Open the subject's active interval (overwrites the begin slot) and
    /// record an ordinary null-valued timeline entry.
    Begin { subject: SubjectId },

    /// Close the subject's active interval (overwrites the end slot) and
    /// record an ordinary null-valued timeline entry.
    End { subject: SubjectId },

    /// Mark that the event touched the subject without setting its value.
    Pertains { subject: SubjectId },
}

impl Outcome {
    /// Assign `value` to `subject`.
    #[must_use]
    pub fn set(subject: SubjectId, value: impl Into<Value>) -> Self {
        Self::Set {
            subject,
            value: value.into(),
        }
    }

    /// Open `subject`'s active interval.
    #[must_use]
    pub const fn begin(subject: SubjectId) -> Self {
        Self::Begin { subject }
    }

    /// Close `subject`'s active interval.
    #[must_use]
    pub const fn end(subject: SubjectId) -> Self {
        Self::End { subject }
    }

    /// Mark `subject` as touched without a value.
    #[must_use]
    pub const fn pertains(subject: SubjectId) -> Self {
        Self::Pertains { subject }
    }

    /// The subject this outcome is bound to.
    #[must_use]
    pub const fn subject(&self) -> SubjectId {
        match self {
            Self::Set { subject, .. }
            | Self::Begin { subject }
            | Self::End { subject }
            | Self::Pertains { subject } => *subject,
        }
    }

    /// Returns true if applying this outcome records a hollow marker rather
    /// than a real history value.
    #[must_use]
    pub const fn is_hollow(&self) -> bool {
        matches!(self, Self::Pertains { .. })
    }
}
