//! Exercise data model
//!
//! - `ExerciseRecord`: one extracted exercise
//! - `ExerciseGroup`: the exported value of a generated module
//! - `Popularity`: view-count tiers and the view-count parser
//! - alternatives: similarity linking across a harvested set

pub mod alternatives;
mod exercise;
mod popularity;

pub use alternatives::{link_alternatives, MAX_ALTERNATIVES};
pub use exercise::{record_id, ExerciseGroup, ExerciseRecord};
pub use popularity::{classify_popularity, parse_view_count, Popularity};
