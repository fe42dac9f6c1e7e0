//! # timetree - Hierarchical timelines with point-in-time resolution
//!
//! timetree models a tree of named **subjects**, each carrying a
//! time-indexed sequence of value assignments, plus point-in-time **events**
//! describing what happened and which subjects it affected. Given any point,
//! a subject reports the most-recently-assigned value it (or its default)
//! held at that moment — even when the latest touch was a descendant's event
//! that only *pertains* to it.
//!
//! ## Core Concepts
//!
//! - **Subject**: a named tree node with a chronological value history, a
//!   default, owned children, and non-owning parent links
//! - **Event**: an immutable timestamped occurrence that applies outcomes
//!   and marks pertains-relationships up the ancestor chain
//! - **Outcome**: a deferred, single-use action (set/begin/end/pertains)
//!   bound to one subject, executed exactly once at event commit
//! - **Report**: a derived chronological read model over a subject's subtree
//!
//! ## Usage
//!
//! ```rust
//! use timetree::{Timeline, Value};
//!
//! let mut tl: Timeline<i64> = Timeline::new();
//! let foo = tl.subject("foo")?;
//! let bar = tl.child(foo, "bar")?;
//!
//! tl.record(10, "Start something").begin(foo).commit()?;
//! tl.record(20, "Set value").set(foo, 42i64).commit()?;
//! tl.record(22, "Set value of child").set(bar, "hello").commit()?;
//!
//! assert_eq!(tl.at(foo, 22)?, &Value::Int(42));
//! assert_eq!(tl.at(bar, 22)?, &Value::String("hello".into()));
//! println!("{}", tl.report(foo)?);
//! # Ok::<(), timetree::TimelineError>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod event;
pub mod point;
pub mod report;
pub mod subject;
pub mod timeline;
pub mod value;

// Re-export primary types at crate root for convenience
pub use error::{TimelineError, TimelineResult};
pub use event::{Event, EventId, Outcome};
pub use point::Point;
pub use report::{Report, ReportEntry};
pub use subject::{Boundaries, HistoryEntry, Recorded, Subject, SubjectId};
pub use timeline::{EventBuilder, Timeline};
pub use value::Value;
