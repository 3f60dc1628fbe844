//! Generated module assembly
//!
//! Wraps a serialized exercise group in an importable module: the type
//! import, a header comment block, and one exported constant.

use crate::config::CategoryConfig;
use crate::model::ExerciseGroup;
use crate::output::literal::{to_literal_string, SerializeError, ToLiteral};
use crate::output::{write_atomically, OutputResult};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;

/// Type annotation of every exported constant
pub const GROUP_TYPE: &str = "ExerciseGroup";

/// Renders a module around the group with the given header comment lines
pub fn render_module(
    type_import: &str,
    variable_name: &str,
    header: &[String],
    group: &ExerciseGroup,
) -> Result<String, SerializeError> {
    let body = to_literal_string(&group.to_literal())?;

    let mut module = String::new();
    module.push_str(type_import);
    module.push_str("\n\n");
    for line in header {
        module.push_str("// ");
        module.push_str(line);
        module.push('\n');
    }
    if !header.is_empty() {
        module.push('\n');
    }
    module.push_str(&format!(
        "export const {}: {} = {};\n",
        variable_name, GROUP_TYPE, body
    ));
    Ok(module)
}

/// Renders the final module with source, record count and generation time
pub fn render_final_module(
    category: &CategoryConfig,
    type_import: &str,
    group: &ExerciseGroup,
    generated_at: DateTime<Utc>,
) -> Result<String, SerializeError> {
    let header = vec![
        "This file was generated automatically by the exercise scraper".to_string(),
        format!("Source: {}", category.url),
        format!("Total exercises: {}", group.exercises.len()),
        format!(
            "Generated on: {}",
            generated_at.to_rfc3339_opts(SecondsFormat::Millis, true)
        ),
    ];
    render_module(type_import, &category.variable_name, &header, group)
}

/// Serializes the group and writes the final module for a category
pub fn write_final_module(
    path: &Path,
    category: &CategoryConfig,
    type_import: &str,
    group: &ExerciseGroup,
) -> OutputResult<()> {
    let contents = render_final_module(category, type_import, group, Utc::now())?;
    write_atomically(path, &contents)?;
    tracing::info!(
        "Wrote {} exercises to {}",
        group.exercises.len(),
        path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ExerciseRecord;
    use chrono::TimeZone;

    fn category() -> CategoryConfig {
        CategoryConfig::new(
            "abs",
            "https://example.com/exercises/abs",
            "Abs",
            "abs",
            "absExercises",
        )
    }

    #[test]
    fn test_final_module_header() {
        let group = ExerciseGroup {
            body_part: "Abs".to_string(),
            exercises: vec![ExerciseRecord::placeholder("abs", "Abs", 1)],
        };
        let generated_at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 0).unwrap();
        let module = render_final_module(
            &category(),
            "import { ExerciseGroup } from '../types/exercises';",
            &group,
            generated_at,
        )
        .unwrap();

        assert!(module.starts_with("import { ExerciseGroup } from '../types/exercises';\n\n"));
        assert!(module.contains("// Source: https://example.com/exercises/abs\n"));
        assert!(module.contains("// Total exercises: 1\n"));
        assert!(module.contains("// Generated on: 2024-03-01T12:30:00.000Z\n"));
        assert!(module.contains("export const absExercises: ExerciseGroup = {\n  bodyPart: \"Abs\",\n"));
        assert!(module.ends_with("};\n"));
    }

    #[test]
    fn test_module_without_header() {
        let group = ExerciseGroup {
            body_part: "Abs".to_string(),
            exercises: vec![],
        };
        let module = render_module("import x;", "absExercises", &[], &group).unwrap();
        assert_eq!(
            module,
            "import x;\n\nexport const absExercises: ExerciseGroup = {\n  bodyPart: \"Abs\",\n  exercises: []\n};\n"
        );
    }
}
