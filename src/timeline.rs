//! The timeline arena and the event construction pipeline.
//!
//! [`Timeline`] owns every subject and every event. Subjects reference their
//! parents by id only, so the tree is reachable top-down through owned child
//! maps and bottom-up through non-owning ids — the shape pertains-propagation
//! needs. Event construction via [`EventBuilder::commit`] is the single
//! mutation trigger for histories and boundaries; defaults are static
//! configuration and bypass it.

use serde::{Deserialize, Serialize};

use crate::error::{TimelineError, TimelineResult};
use crate::event::{Event, EventId, Outcome};
use crate::point::Point;
use crate::subject::{Boundaries, Subject, SubjectId};
use crate::value::Value;

/// A tree of subjects with time-indexed value histories.
///
/// # Examples
///
/// ```
/// use timetree::{Timeline, Value};
///
/// let mut tl: Timeline<i64> = Timeline::new();
/// let foo = tl.subject("foo").unwrap();
/// let bar = tl.child(foo, "bar").unwrap();
///
/// tl.record(20, "Set value").set(foo, 42i64).commit().unwrap();
/// tl.record(22, "Set value of child").set(bar, "hello").commit().unwrap();
///
/// assert_eq!(tl.at(foo, 19).unwrap(), &Value::Null);
/// assert_eq!(tl.at(foo, 22).unwrap(), &Value::Int(42));
/// assert_eq!(tl.at(bar, 22).unwrap(), &Value::String("hello".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeline<P> {
    subjects: Vec<Subject<P>>,
    events: Vec<Event<P>>,
    roots: Vec<SubjectId>,
    next_seq: u64,
}

impl<P: Point> Timeline<P> {
    /// Creates an empty timeline.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subjects: Vec::new(),
            events: Vec::new(),
            roots: Vec::new(),
            next_seq: 0,
        }
    }

    /// Creates a root subject with a null default.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::EmptySubjectName`] if `name` is empty.
    pub fn subject(&mut self, name: impl Into<String>) -> TimelineResult<SubjectId> {
        self.subject_with_default(name, Value::Null)
    }

    /// Creates a root subject with an explicit default.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::EmptySubjectName`] if `name` is empty.
    pub fn subject_with_default(
        &mut self,
        name: impl Into<String>,
        default: Value,
    ) -> TimelineResult<SubjectId> {
        let name = name.into();
        if name.is_empty() {
            return Err(TimelineError::EmptySubjectName);
        }
        let id = self.push_subject(Subject::new(name, Vec::new(), default));
        self.roots.push(id);
        Ok(id)
    }

    /// Returns `parent`'s child named `name`, creating it on first access.
    ///
    /// Auto-vivification: the child is created with a null default and the
    /// display name `"{parent}.{name}"`, so deep chains are valid without
    /// ever being declared. Creation is static configuration — no event, no
    /// history entry.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownSubject`] if `parent` does not resolve
    /// and [`TimelineError::EmptySubjectName`] if `name` is empty.
    pub fn child(&mut self, parent: SubjectId, name: &str) -> TimelineResult<SubjectId> {
        if name.is_empty() {
            return Err(TimelineError::EmptySubjectName);
        }
        let record = self.subject_checked(parent)?;
        if let Some(existing) = record.child(name) {
            return Ok(existing);
        }
        let full_name = format!("{}.{}", record.name(), name);
        let id = self.push_subject(Subject::new(full_name, vec![parent], Value::Null));
        self.subjects[parent.index()].insert_child(name.to_string(), id);
        Ok(id)
    }

    /// Eagerly creates `parent`'s child named `name` with an explicit
    /// default.
    ///
    /// If the child already exists (say, auto-vivified earlier) its history
    /// is kept and only its default is replaced.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Timeline::child`].
    pub fn make_child(
        &mut self,
        parent: SubjectId,
        name: &str,
        default: Value,
    ) -> TimelineResult<SubjectId> {
        let id = self.child(parent, name)?;
        self.subjects[id.index()].set_default(default);
        Ok(id)
    }

    /// Write-through default configuration: creates the child if absent and
    /// sets its default, without creating an event or history entry.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Timeline::child`].
    pub fn set_default(
        &mut self,
        parent: SubjectId,
        name: &str,
        value: impl Into<Value>,
    ) -> TimelineResult<SubjectId> {
        self.make_child(parent, name, value.into())
    }

    /// Attaches an existing subject as `parent`'s child under `name`, adding
    /// `parent` to the child's ordered parent set.
    ///
    /// This is how diamond-shaped ancestry is built: a subject adopted by a
    /// second parent reports both chains from [`Timeline::ancestors`], with
    /// shared ancestors collected once. Like default configuration, adoption
    /// creates no event and no history entry. Duplicate links are ignored.
    /// Children only ever link downward, so callers keep the graph acyclic;
    /// traversal stays defensive about cycles regardless.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownSubject`] if either id does not
    /// resolve and [`TimelineError::EmptySubjectName`] if `name` is empty.
    pub fn adopt(
        &mut self,
        parent: SubjectId,
        name: &str,
        child: SubjectId,
    ) -> TimelineResult<()> {
        if name.is_empty() {
            return Err(TimelineError::EmptySubjectName);
        }
        self.subject_checked(parent)?;
        self.subject_checked(child)?;
        self.subjects[parent.index()].insert_child(name.to_string(), child);
        self.subjects[child.index()].add_parent(parent);
        Ok(())
    }

    /// Read access to a subject record, or `None` if the id does not
    /// resolve.
    #[must_use]
    pub fn get(&self, id: SubjectId) -> Option<&Subject<P>> {
        self.subjects.get(id.index())
    }

    /// The subject's display name.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownSubject`] if `id` does not resolve.
    pub fn name(&self, id: SubjectId) -> TimelineResult<&str> {
        Ok(self.subject_checked(id)?.name())
    }

    /// The most recent real value the subject held at `point`, falling back
    /// to its default. Hollow markers are never observable here.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownSubject`] if `id` does not resolve.
    pub fn at(&self, id: SubjectId, point: P) -> TimelineResult<&Value> {
        Ok(self.subject_checked(id)?.resolve_at(point))
    }

    /// The subject's boundaries pair, inherited from the nearest ancestor
    /// with a set pair when the subject itself has none.
    ///
    /// Parents are consulted in declaration order, nearest level first.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownSubject`] if `id` does not resolve.
    pub fn boundaries(&self, id: SubjectId) -> TimelineResult<Boundaries> {
        self.subject_checked(id)?;
        let mut visited = vec![false; self.subjects.len()];
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                let Some(record) = self.mark_visited(&mut visited, current) else {
                    continue;
                };
                if record.own_boundaries().is_set() {
                    return Ok(record.own_boundaries());
                }
                next.extend_from_slice(record.parents());
            }
            frontier = next;
        }
        Ok(Boundaries::default())
    }

    /// Collects the subject itself plus every subject reachable through
    /// parent ids, deduplicated, in first-seen order (breadth-first, nearest
    /// level first).
    ///
    /// Cycle-safe by a visited set even though construction forbids cycles.
    /// Ids that do not resolve — including `id` itself — contribute nothing:
    /// a released ancestor is treated as reaching the root.
    #[must_use]
    pub fn ancestors(&self, id: SubjectId) -> Vec<SubjectId> {
        let mut visited = vec![false; self.subjects.len()];
        let mut collected = Vec::new();
        let mut frontier = vec![id];
        while !frontier.is_empty() {
            let mut next = Vec::new();
            for current in frontier {
                let Some(record) = self.mark_visited(&mut visited, current) else {
                    continue;
                };
                collected.push(current);
                next.extend_from_slice(record.parents());
            }
            frontier = next;
        }
        collected
    }

    /// Read access to an event, or `None` if the id does not resolve.
    #[must_use]
    pub fn event(&self, id: EventId) -> Option<&Event<P>> {
        self.events.get(id.index())
    }

    /// The event behind `id`.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownEvent`] if `id` does not resolve.
    pub fn event_checked(&self, id: EventId) -> TimelineResult<&Event<P>> {
        self.event(id).ok_or(TimelineError::UnknownEvent { id })
    }

    /// All events in creation order.
    #[must_use]
    pub fn events(&self) -> &[Event<P>] {
        &self.events
    }

    /// The root subjects in creation order.
    #[must_use]
    pub fn roots(&self) -> &[SubjectId] {
        &self.roots
    }

    /// Starts building an event at `point`.
    ///
    /// Nothing is applied until [`EventBuilder::commit`].
    pub fn record(&mut self, point: P, description: impl Into<String>) -> EventBuilder<'_, P> {
        EventBuilder {
            timeline: self,
            point,
            description: description.into(),
            targets: Vec::new(),
        }
    }

    fn subject_checked(&self, id: SubjectId) -> TimelineResult<&Subject<P>> {
        self.get(id).ok_or(TimelineError::UnknownSubject { id })
    }

    // Arena ids are u32; running out of index space is unrecoverable, so
    // fail fast instead of aliasing ids.
    fn push_subject(&mut self, subject: Subject<P>) -> SubjectId {
        let id = SubjectId::from_index(
            u32::try_from(self.subjects.len()).expect("subject arena exceeds u32 index space"),
        );
        self.subjects.push(subject);
        id
    }

    /// Resolves `id` and flips its visited bit, or `None` if it is already
    /// visited or does not resolve.
    fn mark_visited(&self, visited: &mut [bool], id: SubjectId) -> Option<&Subject<P>> {
        let record = self.get(id)?;
        let seen = visited.get_mut(id.index())?;
        if *seen {
            return None;
        }
        *seen = true;
        Some(record)
    }

    fn alloc_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<P: Point> Default for Timeline<P> {
    fn default() -> Self {
        Self::new()
    }
}

/// A target supplied to an event: a bare subject (implicit pertains touch) or
/// an explicit outcome.
#[derive(Debug, Clone)]
enum Target {
    Touch(SubjectId),
    Outcome(Outcome),
}

impl Target {
    const fn subject(&self) -> SubjectId {
        match self {
            Self::Touch(subject) => *subject,
            Self::Outcome(outcome) => outcome.subject(),
        }
    }
}

/// Builder for an event and the outcomes it applies.
///
/// # Example
///
/// ```
/// use timetree::Timeline;
///
/// let mut tl: Timeline<i64> = Timeline::new();
/// let task = tl.subject("task").unwrap();
/// let worker = tl.child(task, "worker").unwrap();
///
/// tl.record(10, "Kickoff")
///     .begin(task)
///     .set(worker, "alice")
///     .commit()
///     .unwrap();
/// ```
#[derive(Debug)]
pub struct EventBuilder<'a, P: Point> {
    timeline: &'a mut Timeline<P>,
    point: P,
    description: String,
    targets: Vec<Target>,
}

impl<P: Point> EventBuilder<'_, P> {
    /// Assign `value` to `subject` at this event's point.
    #[must_use]
    pub fn set(mut self, subject: SubjectId, value: impl Into<Value>) -> Self {
        self.targets.push(Target::Outcome(Outcome::set(subject, value)));
        self
    }

    /// Open `subject`'s active interval at this event.
    #[must_use]
    pub fn begin(mut self, subject: SubjectId) -> Self {
        self.targets.push(Target::Outcome(Outcome::begin(subject)));
        self
    }

    /// Close `subject`'s active interval at this event.
    #[must_use]
    pub fn end(mut self, subject: SubjectId) -> Self {
        self.targets.push(Target::Outcome(Outcome::end(subject)));
        self
    }

    /// Name `subject` as a bare target: it and every ancestor receive a
    /// hollow touch marker.
    #[must_use]
    pub fn touch(mut self, subject: SubjectId) -> Self {
        self.targets.push(Target::Touch(subject));
        self
    }

    /// Add a pre-built outcome.
    #[must_use]
    pub fn outcome(mut self, outcome: Outcome) -> Self {
        self.targets.push(Target::Outcome(outcome));
        self
    }

    /// Materializes the event and applies every outcome.
    ///
    /// Application order: first every touched subject and its full ancestor
    /// chain (ancestor collection includes the subject itself) is queued for
    /// a hollow marker, minus the subjects bound by a value-bearing outcome;
    /// markers are recorded, then outcomes apply left-to-right in the order
    /// they were supplied. Each touched subject gains exactly one history
    /// entry for this event.
    ///
    /// # Errors
    ///
    /// Returns [`TimelineError::UnknownSubject`] if any target names a
    /// subject outside this timeline; nothing is mutated in that case.
    pub fn commit(self) -> TimelineResult<EventId> {
        let Self {
            timeline,
            point,
            description,
            targets,
        } = self;

        // Fail fast before any mutation.
        for target in &targets {
            let id = target.subject();
            if timeline.get(id).is_none() {
                return Err(TimelineError::UnknownSubject { id });
            }
        }

        let event = EventId::from_index(
            u32::try_from(timeline.events.len()).expect("event arena exceeds u32 index space"),
        );
        timeline.events.push(Event::new(point, description));

        // Pertains union over all targets, first-seen order.
        let mut pertains: Vec<SubjectId> = Vec::new();
        for target in &targets {
            for ancestor in timeline.ancestors(target.subject()) {
                if !pertains.contains(&ancestor) {
                    pertains.push(ancestor);
                }
            }
        }
        // A subject bound by a value-bearing outcome gets its real entry
        // instead of a hollow marker.
        pertains.retain(|id| {
            !targets.iter().any(|t| {
                matches!(t, Target::Outcome(o) if !o.is_hollow() && o.subject() == *id)
            })
        });

        for id in pertains {
            let seq = timeline.alloc_seq();
            timeline.subjects[id.index()].record_hollow(event, point, seq);
        }

        for target in targets {
            let Target::Outcome(outcome) = target else {
                continue;
            };
            let seq = timeline.alloc_seq();
            let subject = outcome.subject();
            let record = &mut timeline.subjects[subject.index()];
            match outcome {
                Outcome::Set { value, .. } => {
                    record.record_value(event, point, seq, value);
                }
                Outcome::Begin { .. } => {
                    record.set_begin(event);
                    record.record_value(event, point, seq, Value::Null);
                }
                Outcome::End { .. } => {
                    record.set_end(event);
                    record.record_value(event, point, seq, Value::Null);
                }
                Outcome::Pertains { .. } => {
                    record.record_hollow(event, point, seq);
                }
            }
        }

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subject::Recorded;

    fn hollow_count(tl: &Timeline<i64>, id: SubjectId) -> usize {
        tl.get(id)
            .unwrap()
            .history()
            .iter()
            .filter(|e| e.recorded.is_hollow())
            .count()
    }

    #[test]
    fn test_subject_creation() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        assert_eq!(tl.name(foo).unwrap(), "foo");
        assert_eq!(tl.roots(), &[foo]);
        assert_eq!(tl.get(foo).unwrap().default_value(), &Value::Null);
    }

    #[test]
    fn test_subject_empty_name_rejected() {
        let mut tl: Timeline<i64> = Timeline::new();
        assert_eq!(tl.subject(""), Err(TimelineError::EmptySubjectName));
        let foo = tl.subject("foo").unwrap();
        assert_eq!(tl.child(foo, ""), Err(TimelineError::EmptySubjectName));
    }

    #[test]
    fn test_child_auto_vivification_is_idempotent() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.child(foo, "bar").unwrap();
        let again = tl.child(foo, "bar").unwrap();

        assert_eq!(bar, again);
        assert_eq!(tl.name(bar).unwrap(), "foo.bar");
        assert_eq!(tl.get(bar).unwrap().parents(), &[foo]);
    }

    #[test]
    fn test_deep_chain_on_first_access() {
        let mut tl: Timeline<i64> = Timeline::new();
        let x = tl.subject("x").unwrap();
        let y = tl.child(x, "y").unwrap();
        let z = tl.child(y, "z").unwrap();

        assert_eq!(tl.name(z).unwrap(), "x.y.z");
        assert_eq!(tl.ancestors(z), vec![z, y, x]);
    }

    #[test]
    fn test_make_child_keeps_history_replaces_default() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.child(foo, "bar").unwrap();
        tl.record(10, "set").set(bar, 1i64).commit().unwrap();

        let same = tl.make_child(foo, "bar", Value::Int(99)).unwrap();
        assert_eq!(same, bar);
        assert_eq!(tl.get(bar).unwrap().default_value(), &Value::Int(99));
        assert_eq!(tl.at(bar, 10).unwrap(), &Value::Int(1));
        assert_eq!(tl.at(bar, 9).unwrap(), &Value::Int(99));
    }

    #[test]
    fn test_set_default_creates_no_event() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.set_default(foo, "bar", 5i64).unwrap();

        assert!(tl.events().is_empty());
        assert!(tl.get(bar).unwrap().history().is_empty());
        assert_eq!(tl.at(bar, 0).unwrap(), &Value::Int(5));
    }

    #[test]
    fn test_unknown_subject_queries_fail() {
        let tl: Timeline<i64> = Timeline::new();
        let ghost = SubjectId::from_index(9);
        assert!(tl.name(ghost).unwrap_err().is_unknown_subject());
        assert!(tl.at(ghost, 0).unwrap_err().is_unknown_subject());
        assert!(tl.boundaries(ghost).unwrap_err().is_unknown_subject());
        assert!(tl.ancestors(ghost).is_empty());
    }

    #[test]
    fn test_commit_fails_fast_without_partial_mutation() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let ghost = SubjectId::from_index(42);

        let err = tl
            .record(10, "bad")
            .set(foo, 1i64)
            .set(ghost, 2i64)
            .commit()
            .unwrap_err();

        assert_eq!(err, TimelineError::UnknownSubject { id: ghost });
        assert!(tl.events().is_empty());
        assert!(tl.get(foo).unwrap().history().is_empty());
    }

    #[test]
    fn test_bare_touch_marks_self_and_ancestors() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.child(foo, "bar").unwrap();
        let baz = tl.child(bar, "baz").unwrap();
        let sibling = tl.child(foo, "sibling").unwrap();

        tl.record(10, "touch").touch(baz).commit().unwrap();

        assert_eq!(hollow_count(&tl, baz), 1);
        assert_eq!(hollow_count(&tl, bar), 1);
        assert_eq!(hollow_count(&tl, foo), 1);
        assert!(tl.get(sibling).unwrap().history().is_empty());
    }

    #[test]
    fn test_set_on_child_marks_ancestors_hollow() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.child(foo, "bar").unwrap();

        let ev = tl.record(22, "set child").set(bar, "hello").commit().unwrap();

        // bar got the real value, foo only the hollow marker.
        let bar_entry = &tl.get(bar).unwrap().history()[0];
        assert_eq!(
            bar_entry.recorded,
            Recorded::Value(Value::String("hello".into()))
        );
        let foo_entry = &tl.get(foo).unwrap().history()[0];
        assert!(foo_entry.recorded.is_hollow());
        assert_eq!(foo_entry.event, ev);
        assert_eq!(tl.get(foo).unwrap().history().len(), 1);
        assert_eq!(tl.get(bar).unwrap().history().len(), 1);
    }

    #[test]
    fn test_one_entry_per_subject_per_event() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();

        // Bound by a real outcome AND named as a bare target: the real entry
        // wins and there is exactly one entry.
        tl.record(10, "both").touch(foo).set(foo, 1i64).commit().unwrap();
        assert_eq!(tl.get(foo).unwrap().history().len(), 1);
        assert_eq!(tl.at(foo, 10).unwrap(), &Value::Int(1));

        // Two sets in one event: last supplied wins, still one entry.
        tl.record(20, "twice").set(foo, 2i64).set(foo, 3i64).commit().unwrap();
        assert_eq!(tl.get(foo).unwrap().history().len(), 2);
        assert_eq!(tl.at(foo, 20).unwrap(), &Value::Int(3));
    }

    #[test]
    fn test_explicit_pertains_outcome() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.child(foo, "bar").unwrap();

        tl.record(10, "nudge")
            .outcome(Outcome::pertains(bar))
            .commit()
            .unwrap();

        assert_eq!(hollow_count(&tl, bar), 1);
        assert_eq!(hollow_count(&tl, foo), 1);
    }

    #[test]
    fn test_begin_end_update_boundaries_and_history() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();

        let started = tl.record(10, "start").begin(foo).commit().unwrap();
        let stopped = tl.record(30, "stop").end(foo).commit().unwrap();

        let bounds = tl.boundaries(foo).unwrap();
        assert_eq!(bounds.begin, Some(started));
        assert_eq!(bounds.end, Some(stopped));

        // Begin/end also show up as ordinary null-valued timeline entries.
        let history = tl.get(foo).unwrap().history();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].recorded, Recorded::Value(Value::Null));
        assert_eq!(history[1].recorded, Recorded::Value(Value::Null));
    }

    #[test]
    fn test_begin_twice_overwrites_start_slot() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();

        tl.record(10, "start").begin(foo).commit().unwrap();
        let stopped = tl.record(20, "stop").end(foo).commit().unwrap();
        let restarted = tl.record(30, "restart").begin(foo).commit().unwrap();

        let bounds = tl.boundaries(foo).unwrap();
        assert_eq!(bounds.begin, Some(restarted));
        assert_eq!(bounds.end, Some(stopped));
    }

    #[test]
    fn test_boundaries_inherited_from_nearest_ancestor() {
        let mut tl: Timeline<i64> = Timeline::new();
        let root = tl.subject("root").unwrap();
        let mid = tl.child(root, "mid").unwrap();
        let leaf = tl.child(mid, "leaf").unwrap();

        let started = tl.record(10, "start").begin(root).commit().unwrap();

        // Neither mid nor leaf has its own pair; both inherit root's.
        assert_eq!(tl.boundaries(leaf).unwrap().begin, Some(started));
        assert_eq!(tl.boundaries(mid).unwrap().begin, Some(started));

        // Once mid gets its own pair, leaf inherits the nearer one.
        let mid_started = tl.record(20, "mid start").begin(mid).commit().unwrap();
        assert_eq!(tl.boundaries(leaf).unwrap().begin, Some(mid_started));
        assert_eq!(tl.boundaries(root).unwrap().begin, Some(started));
    }

    #[test]
    fn test_boundaries_unset_everywhere() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        assert!(!tl.boundaries(foo).unwrap().is_set());
    }

    #[test]
    fn test_ancestors_single_parent_chain_size() {
        let mut tl: Timeline<i64> = Timeline::new();
        let a = tl.subject("a").unwrap();
        let b = tl.child(a, "b").unwrap();
        let c = tl.child(b, "c").unwrap();
        let d = tl.child(c, "d").unwrap();

        assert_eq!(tl.ancestors(d).len(), 4); // levels to the root inclusive
        assert_eq!(tl.ancestors(a), vec![a]);

        // Idempotent and order-stable.
        assert_eq!(tl.ancestors(d), tl.ancestors(d));
    }

    #[test]
    fn test_adopt_builds_diamond_ancestry() {
        let mut tl: Timeline<i64> = Timeline::new();
        let root = tl.subject("root").unwrap();
        let left = tl.child(root, "left").unwrap();
        let right = tl.child(root, "right").unwrap();
        let shared = tl.child(left, "shared").unwrap();

        tl.adopt(right, "shared", shared).unwrap();

        // Both chains are reported; the shared root is collected once.
        assert_eq!(tl.ancestors(shared), vec![shared, left, right, root]);
        assert_eq!(tl.get(shared).unwrap().parents(), &[left, right]);
        assert_eq!(tl.get(right).unwrap().child("shared"), Some(shared));

        // Adoption is idempotent and event-free.
        tl.adopt(right, "shared", shared).unwrap();
        assert_eq!(tl.get(shared).unwrap().parents(), &[left, right]);
        assert!(tl.events().is_empty());
    }

    #[test]
    fn test_diamond_ancestors_marked_once_per_event() {
        let mut tl: Timeline<i64> = Timeline::new();
        let root = tl.subject("root").unwrap();
        let left = tl.child(root, "left").unwrap();
        let right = tl.child(root, "right").unwrap();
        let shared = tl.child(left, "shared").unwrap();
        tl.adopt(right, "shared", shared).unwrap();

        tl.record(10, "deep change").set(shared, 1i64).commit().unwrap();

        // Root is reachable through both chains but gains a single hollow
        // marker; so does each intermediate parent.
        for id in [root, left, right] {
            assert_eq!(tl.get(id).unwrap().history().len(), 1);
            assert!(tl.get(id).unwrap().history()[0].recorded.is_hollow());
        }
        assert_eq!(tl.at(shared, 10).unwrap(), &Value::Int(1));

        // The event is reachable from root via both paths yet reported once.
        assert_eq!(tl.report(root).unwrap().len(), 1);
    }

    #[test]
    fn test_diamond_boundaries_inherit_from_either_chain() {
        let mut tl: Timeline<i64> = Timeline::new();
        let root = tl.subject("root").unwrap();
        let left = tl.child(root, "left").unwrap();
        let right = tl.child(root, "right").unwrap();
        let shared = tl.child(left, "shared").unwrap();
        tl.adopt(right, "shared", shared).unwrap();

        let started = tl.record(5, "start right").begin(right).commit().unwrap();

        // shared has no pair and left has none either; the nearest set pair
        // sits on the second parent.
        assert_eq!(tl.boundaries(shared).unwrap().begin, Some(started));
    }

    #[test]
    fn test_adopt_validates_arguments() {
        let mut tl: Timeline<i64> = Timeline::new();
        let root = tl.subject("root").unwrap();
        let child = tl.child(root, "child").unwrap();
        let ghost = SubjectId::from_index(77);

        assert_eq!(
            tl.adopt(ghost, "child", child),
            Err(TimelineError::UnknownSubject { id: ghost })
        );
        assert_eq!(
            tl.adopt(root, "other", ghost),
            Err(TimelineError::UnknownSubject { id: ghost })
        );
        assert_eq!(
            tl.adopt(root, "", child),
            Err(TimelineError::EmptySubjectName)
        );
        // Nothing changed on the failed calls.
        assert_eq!(tl.get(child).unwrap().parents(), &[root]);
    }

    #[test]
    fn test_event_checked_lookup() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let ev = tl.record(10, "set").set(foo, 1i64).commit().unwrap();

        assert_eq!(tl.event_checked(ev).unwrap().point, 10);

        let ghost = EventId::from_index(9);
        let err = tl.event_checked(ghost).unwrap_err();
        assert_eq!(err, TimelineError::UnknownEvent { id: ghost });
        assert!(err.is_unknown_event());
    }

    #[test]
    fn test_event_ids_order_by_creation() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let first = tl.record(20, "later point, earlier event").set(foo, 1i64).commit().unwrap();
        let second = tl.record(10, "earlier point, later event").set(foo, 2i64).commit().unwrap();

        assert!(first < second);
        assert_eq!(tl.event(first).unwrap().point, 20);
        assert_eq!(tl.event(second).unwrap().point, 10);
        assert_eq!(tl.events().len(), 2);
    }

    #[test]
    fn test_out_of_order_events_resolve_correctly() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        tl.record(30, "third").set(foo, 3i64).commit().unwrap();
        tl.record(10, "first").set(foo, 1i64).commit().unwrap();
        tl.record(20, "second").set(foo, 2i64).commit().unwrap();

        assert_eq!(tl.at(foo, 15).unwrap(), &Value::Int(1));
        assert_eq!(tl.at(foo, 25).unwrap(), &Value::Int(2));
        assert_eq!(tl.at(foo, 35).unwrap(), &Value::Int(3));
    }

    #[test]
    fn test_timeline_serialization_round_trip() {
        let mut tl: Timeline<i64> = Timeline::new();
        let foo = tl.subject("foo").unwrap();
        let bar = tl.child(foo, "bar").unwrap();
        tl.record(10, "start").begin(foo).commit().unwrap();
        tl.record(22, "set").set(bar, "hello").commit().unwrap();

        let json = serde_json::to_string(&tl).unwrap();
        let back: Timeline<i64> = serde_json::from_str(&json).unwrap();
        assert_eq!(tl, back);
        assert_eq!(back.at(bar, 22).unwrap(), &Value::String("hello".into()));
    }

    #[test]
    fn test_chrono_points() {
        use chrono::{Duration, TimeZone, Utc};

        let mut tl = Timeline::new();
        let job = tl.subject("job").unwrap();
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();

        tl.record(start, "queued").set(job, "queued").commit().unwrap();
        tl.record(start + Duration::minutes(5), "running")
            .set(job, "running")
            .commit()
            .unwrap();

        assert_eq!(
            tl.at(job, start + Duration::minutes(1)).unwrap(),
            &Value::String("queued".into())
        );
        assert_eq!(
            tl.at(job, start + Duration::hours(1)).unwrap(),
            &Value::String("running".into())
        );
    }
}
