//! Similarity-based alternative suggestions
//!
//! Each exercise is scored against every other exercise in the same
//! harvest; the best-scoring ids become its alternatives.

use crate::model::ExerciseRecord;

/// Alternatives kept per exercise
pub const MAX_ALTERNATIVES: usize = 5;

fn overlaps(a: &[String], b: &[String]) -> bool {
    a.iter().any(|item| b.contains(item))
}

fn same_optional(a: &Option<String>, b: &Option<String>) -> bool {
    matches!((a, b), (Some(a), Some(b)) if !a.is_empty() && a == b)
}

/// Similarity between two exercises; higher is closer
pub fn similarity(a: &ExerciseRecord, b: &ExerciseRecord) -> u32 {
    let mut score = 0;
    if overlaps(&a.target_body_parts, &b.target_body_parts) {
        score += 3;
    }
    if overlaps(&a.exercise_types, &b.exercise_types) {
        score += 2;
    }
    if a.difficulty == b.difficulty {
        score += 2;
    }
    if overlaps(&a.equipment, &b.equipment) {
        score += 2;
    }
    if overlaps(&a.muscles, &b.muscles) {
        score += 3;
    }
    if same_optional(&a.mechanics, &b.mechanics) {
        score += 2;
    }
    if same_optional(&a.force_type, &b.force_type) {
        score += 2;
    }
    score
}

/// Returns up to `max` ids of the exercises most similar to `exercise`
///
/// Ties keep discovery order.
pub fn find_alternatives(
    exercise: &ExerciseRecord,
    all: &[ExerciseRecord],
    max: usize,
) -> Vec<String> {
    let mut scored: Vec<(u32, &ExerciseRecord)> = all
        .iter()
        .filter(|other| other.id != exercise.id)
        .map(|other| (similarity(exercise, other), other))
        .collect();

    // Stable sort keeps discovery order among equal scores
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    scored
        .into_iter()
        .take(max)
        .map(|(_, other)| other.id.clone())
        .collect()
}

/// Fills every record's alternatives from the rest of the set
pub fn link_alternatives(records: &mut [ExerciseRecord], max: usize) {
    let suggestions: Vec<Vec<String>> = records
        .iter()
        .map(|record| find_alternatives(record, records, max))
        .collect();

    for (record, alternatives) in records.iter_mut().zip(suggestions) {
        record.alternatives = alternatives;
    }
}
