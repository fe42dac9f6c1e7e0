//! Subjects: named tree nodes carrying chronological value histories.
//!
//! A subject owns its children (by name) and holds non-owning ids of its
//! parents. Its history is a point-ordered list of `(event, recorded)` pairs
//! where the recorded cell is either a real [`Value`] or the hollow marker
//! meaning "an event touched a relative of mine but did not set *my* value".
//!
//! Subjects live in the [`crate::Timeline`] arena; everything here that
//! mutates state is crate-internal and driven by event commits.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::event::EventId;
use crate::value::Value;

/// Identifier of a subject within a timeline's arena.
///
/// Parent links are stored as plain ids, never as owning references: upward
/// traversal through an id that no longer resolves behaves as if the parent
/// were absent.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SubjectId(u32);

impl SubjectId {
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

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "subject#{}", self.0)
    }
}

/// A single history cell: a real value or the hollow touch marker.
///
/// Hollow is distinguishable from every legitimate value, including
/// [`Value::Null`], and is never observable through resolution — the resolver
/// skips over it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Recorded {
    /// The event assigned this value to the subject.
    Value(Value),

    /// The event touched the subject (or a relative) without setting its
    /// value.
    Hollow,
}

impl Recorded {
    /// Returns true for the hollow touch marker.
    #[must_use]
    pub const fn is_hollow(&self) -> bool {
        matches!(self, Self::Hollow)
    }

    /// The real value, if this cell holds one.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match self {
            Self::Value(v) => Some(v),
            Self::Hollow => None,
        }
    }
}

/// One chronological entry in a subject's history.
///
/// The event's point is denormalized into the entry so resolution never needs
/// the arena; `seq` is the global insertion sequence number that breaks ties
/// between entries at the same point (last inserted wins).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry<P> {
    /// The event that produced this entry.
    pub event: EventId,

    /// The event's point, copied here for local ordered search.
    pub point: P,

    /// What the event recorded on this subject.
    pub recorded: Recorded,

    pub(crate) seq: u64,
}

/// A subject's explicit active interval, tracked separately from its value
/// history.
///
/// Begin/End outcomes overwrite their slot (last write wins) while preserving
/// the other — an overwrite-not-append policy, unlike the history's
/// append-many policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Boundaries {
    /// The event that opened the interval, if any.
    pub begin: Option<EventId>,

    /// The event that closed the interval, if any.
    pub end: Option<EventId>,
}

impl Boundaries {
    /// Returns true if either slot has been set.
    #[must_use]
    pub const fn is_set(&self) -> bool {
        self.begin.is_some() || self.end.is_some()
    }
}

/// A named tree node holding a chronological value history.
///
/// Created through [`crate::Timeline`]; read-only access is public so the
/// report collaborator (and any other consumer) can iterate histories and
/// child maps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject<P> {
    name: String,
    parents: Vec<SubjectId>,
    default: Value,
    history: Vec<HistoryEntry<P>>,
    children: BTreeMap<String, SubjectId>,
    boundaries: Boundaries,
}

impl<P: Copy + Ord> Subject<P> {
    pub(crate) fn new(name: String, parents: Vec<SubjectId>, default: Value) -> Self {
        Self {
            name,
            parents,
            default,
            history: Vec::new(),
            children: BTreeMap::new(),
            boundaries: Boundaries::default(),
        }
    }

    /// The subject's display name (`"root.child.grandchild"` style).
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The fallback value returned when no history entry covers a query.
    #[must_use]
    pub const fn default_value(&self) -> &Value {
        &self.default
    }

    /// Non-owning ids of this subject's parents, in declaration order.
    #[must_use]
    pub fn parents(&self) -> &[SubjectId] {
        &self.parents
    }

    /// The chronological history, sorted ascending by `(point, insertion)`.
    #[must_use]
    pub fn history(&self) -> &[HistoryEntry<P>] {
        &self.history
    }

    /// This subject's own boundaries pair (not inherited; see
    /// [`crate::Timeline::boundaries`] for the inheriting lookup).
    #[must_use]
    pub const fn own_boundaries(&self) -> Boundaries {
        self.boundaries
    }

    /// Iterates the owned children as `(name, id)` in name order.
    pub fn children(&self) -> impl Iterator<Item = (&str, SubjectId)> {
        self.children.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Looks up an owned child by name.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<SubjectId> {
        self.children.get(name).copied()
    }

    /// The most recent real value at or before `point`, falling back to the
    /// default.
    ///
    /// Binary search for the greatest entry with `entry.point <= point`, then
    /// walk backward over hollow entries until a real value is found. Hollow
    /// markers are therefore never observable here: an ancestor answers "what
    /// was my state" even when the latest touch was a descendant's event.
    #[must_use]
    pub fn resolve_at(&self, point: P) -> &Value {
        let mut idx = self.history.partition_point(|e| e.point <= point);
        loop {
            if idx == 0 {
                return &self.default;
            }
            match &self.history[idx - 1].recorded {
                Recorded::Hollow => idx -= 1,
                Recorded::Value(v) => return v,
            }
        }
    }

    pub(crate) fn set_default(&mut self, default: Value) {
        self.default = default;
    }

    pub(crate) fn insert_child(&mut self, name: String, id: SubjectId) {
        self.children.insert(name, id);
    }

    /// Adds a non-owning parent link; duplicates are ignored so the parent
    /// set stays small and ordered.
    pub(crate) fn add_parent(&mut self, parent: SubjectId) {
        if !self.parents.contains(&parent) {
            self.parents.push(parent);
        }
    }

    pub(crate) fn set_begin(&mut self, event: EventId) {
        self.boundaries.begin = Some(event);
    }

    pub(crate) fn set_end(&mut self, event: EventId) {
        self.boundaries.end = Some(event);
    }

    /// Records a real value for `event`.
    ///
    /// At most one entry per event: a repeated value-bearing outcome for the
    /// same event replaces the earlier cell instead of appending.
    pub(crate) fn record_value(&mut self, event: EventId, point: P, seq: u64, value: Value) {
        if let Some(entry) = self.history.iter_mut().find(|e| e.event == event) {
            entry.recorded = Recorded::Value(value);
            return;
        }
        self.push_sorted(HistoryEntry {
            event,
            point,
            recorded: Recorded::Value(value),
            seq,
        });
    }

    /// Records a hollow touch marker for `event`.
    ///
    /// A hollow marker never displaces an existing entry for the same event,
    /// so it cannot override a real value.
    pub(crate) fn record_hollow(&mut self, event: EventId, point: P, seq: u64) {
        if self.history.iter().any(|e| e.event == event) {
            return;
        }
        self.push_sorted(HistoryEntry {
            event,
            point,
            recorded: Recorded::Hollow,
            seq,
        });
    }

    // Events usually arrive in chronological order, but that is not
    // guaranteed; histories are small, so append + re-sort keeps it simple.
    fn push_sorted(&mut self, entry: HistoryEntry<P>) {
        self.history.push(entry);
        self.history
            .sort_by(|a, b| a.point.cmp(&b.point).then(a.seq.cmp(&b.seq)));
    }
}
