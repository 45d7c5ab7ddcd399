//! Shared types for the campus tour: node categories, node ids, 2D transforms
//! and rectangles.
//!
//! # Invariants
//! - Category flags are disjoint powers of two and fit in a `u32`.
//! - A rectangle with a non-finite component never intersects anything.

mod category;
mod types;

pub use category::{Category, CategoryMatch};
pub use types::{NodeId, Rect, Transform2D};
