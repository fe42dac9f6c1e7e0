//! Human-readable timeline reports.
//!
//! The report is a derived read model assembled from a subject's subtree: it
//! collects every event touching the subject or any descendant, deduplicates
//! events reachable via multiple histories, re-resolves each event's
//! displayed value against the *root* subject, sorts by point, and renders
//! with inter-event elapsed-time annotations.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TimelineResult;
use crate::event::EventId;
use crate::point::Point;
use crate::subject::SubjectId;
use crate::timeline::Timeline;
use crate::value::Value;

/// One rendered line of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry<P> {
    /// The event behind this line.
    pub event: EventId,

    /// When it happened.
    pub point: P,

    /// The event's description.
    pub description: String,

    /// The *root* subject's resolved value at the event's point. `Null`
    /// values are elided from the rendering.
    pub value: Value,
}

/// A chronological report over one subject's subtree.
///
/// Produced by [`Timeline::report`]; render it with `Display` or walk
/// [`Report::entries`] directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report<P> {
    subject_name: String,
    entries: Vec<ReportEntry<P>>,
}

impl<P> Report<P> {
    /// The reported subject's display name.
    #[must_use]
    pub fn subject_name(&self) -> &str {
        &self.subject_name
    }

    /// The entries in ascending point order.
    #[must_use]
    pub fn entries(&self) -> &[ReportEntry<P>] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no event touched the subtree.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<P: Point> fmt::Display for Report<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<P> = None;
        for entry in &self.entries {
            if let Some(prev) = prev {
                writeln!(f, "... {} later", entry.point.delta_since(prev))?;
            }
            write!(f, "{}: {}", entry.point, entry.description)?;
            if !entry.value.is_null() {
                write!(f, " ({})", entry.value)?;
            }
            writeln!(f)?;
            prev = Some(entry.point);
        }
        Ok(())
    }
}

impl<P: Point> Timeline<P> {
    /// Builds a report over `root`'s subtree.
    ///
    /// Events belonging to unrelated subjects are omitted; events reachable
    /// through several of the subtree's histories appear once. Entries are
    /// sorted ascending by point, ties broken by event creation order, and
    /// each entry's value is resolved through `root` itself — not the
    /// descendant the event originally targeted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TimelineError::UnknownSubject`] if `root` does not
    /// resolve.
    pub fn report(&self, root: SubjectId) -> TimelineResult<Report<P>> {
        let root_record = self
            .get(root)
            .ok_or(crate::TimelineError::UnknownSubject { id: root })?;

        // Collect event ids across the subtree, deduplicated.
        let mut seen: BTreeSet<EventId> = BTreeSet::new();
        let mut frontier = vec![root];
        while let Some(id) = frontier.pop() {
            let Some(record) = self.get(id) else {
                continue;
            };
            seen.extend(record.history().iter().map(|e| e.event));
            frontier.extend(record.children().map(|(_, child)| child));
        }

        let mut entries: Vec<ReportEntry<P>> = seen
            .into_iter()
            .filter_map(|event| self.event(event).map(|record| (event, record)))
            .map(|(event, record)| ReportEntry {
                event,
                point: record.point,
                description: record.description.clone(),
                value: root_record.resolve_at(record.point).clone(),
            })
            .collect();
        // BTreeSet iteration already ordered ties by event id; the stable
        // sort keeps that for equal points.
        entries.sort_by(|a, b| a.point.cmp(&b.point));

        Ok(Report {
            subject_name: root_record.name().to_string(),
            entries,
        })
    }
}
