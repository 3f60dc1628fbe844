use crate::model::Popularity;
use crate::output::{Literal, RecordBuilder, ToLiteral};

/// Builds the deterministic record id for a 1-based discovery ordinal
pub fn record_id(id_prefix: &str, ordinal: usize) -> String {
    format!("{}-{}", id_prefix, ordinal)
}

/// One exercise as extracted from its detail page
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    pub target_body_parts: Vec<String>,
    pub exercise_types: Vec<String>,
    pub difficulty: String,
    pub equipment: Vec<String>,
    pub steps: Vec<String>,
    pub tips: Vec<String>,
    pub contraindications: Vec<String>,
    pub muscles: Vec<String>,
    /// Ids of similar exercises in the same harvest
    pub alternatives: Vec<String>,
    pub repetitions: Option<u32>,
    pub sets: Option<u32>,
    /// Rest between sets in seconds
    pub rest_between_sets: Option<u32>,
    pub force_type: Option<String>,
    pub mechanics: Option<String>,
    pub video_url: Option<String>,
    pub image_url: Option<String>,
    pub view_count: Option<u64>,
    pub popularity: Option<Popularity>,
}

impl ExerciseRecord {
    /// Degraded record standing in for a detail page that could not be extracted
    pub fn placeholder(id_prefix: &str, body_part: &str, ordinal: usize) -> Self {
        Self {
            id: record_id(id_prefix, ordinal),
            name: format!("Exercise {}", ordinal),
            description: "Failed to fetch details".to_string(),
            target_body_parts: vec![body_part.to_string()],
            exercise_types: vec!["strength".to_string()],
            difficulty: "beginner".to_string(),
            equipment: vec!["None".to_string()],
            steps: vec!["No instructions available".to_string()],
            muscles: vec![body_part.to_string()],
            ..Self::default()
        }
    }
}

impl ToLiteral for ExerciseRecord {
    fn to_literal(&self) -> Literal {
        RecordBuilder::new()
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("targetBodyParts", &self.target_body_parts)
            .field("exerciseType", &self.exercise_types)
            .field("difficulty", &self.difficulty)
            .field("equipment", &self.equipment)
            .field("steps", &self.steps)
            .field("tips", &self.tips)
            .field("contraindications", &self.contraindications)
            .field("muscles", &self.muscles)
            .field("alternatives", &self.alternatives)
            .optional("repetitions", self.repetitions.as_ref())
            .optional("sets", self.sets.as_ref())
            .optional("restBetweenSets", self.rest_between_sets.as_ref())
            .optional("forceType", self.force_type.as_ref())
            .optional("mechanics", self.mechanics.as_ref())
            .optional("videoUrl", self.video_url.as_ref())
            .optional("imageUrl", self.image_url.as_ref())
            .optional("viewCount", self.view_count.as_ref())
            .optional("popularity", self.popularity.as_ref())
            .build()
    }
}

impl ToLiteral for Popularity {
    fn to_literal(&self) -> Literal {
        Literal::Str(self.as_str().to_string())
    }
}

/// The exported value of a generated module
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseGroup {
    pub body_part: String,
    pub exercises: Vec<ExerciseRecord>,
}

impl ToLiteral for ExerciseGroup {
    fn to_literal(&self) -> Literal {
        RecordBuilder::new()
            .field("bodyPart", &self.body_part)
            .field("exercises", &self.exercises)
            .build()
    }
}
