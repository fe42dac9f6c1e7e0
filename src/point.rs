//! The temporal axis: totally ordered points and elapsed-time deltas.
//!
//! Every event and every history entry is ordered by a [`Point`]. The engine
//! only ever compares points; subtraction is needed solely by the report
//! renderer for its "... N later" annotations.

use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

/// A totally ordered time coordinate.
///
/// Integer ticks cover simulation-style timelines; [`DateTime<Utc>`] covers
/// wall-clock ones. All engine algorithms assume only `<`, `<=`, `==`.
///
/// # Examples
///
/// ```
/// use timetree::Point;
///
/// assert_eq!(25i64.delta_since(10), 15);
/// ```
pub trait Point: Copy + Ord + fmt::Debug + fmt::Display {
    /// Elapsed time between two points, as rendered in reports.
    type Delta: fmt::Display;

    /// Returns the time elapsed since `earlier`.
    ///
    /// Only ever called with `earlier <= self`; the report renderer walks
    /// entries in ascending order.
    fn delta_since(self, earlier: Self) -> Self::Delta;
}

macro_rules! impl_point_for_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl Point for $t {
                type Delta = $t;

                fn delta_since(self, earlier: Self) -> Self::Delta {
                    self - earlier
                }
            }
        )*
    };
}

impl_point_for_int!(i32, i64, u32, u64);

impl Point for DateTime<Utc> {
    type Delta = TimeDelta;

    fn delta_since(self, earlier: Self) -> Self::Delta {
        self - earlier
    }
}
