use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Base URL of the exercise library the built-in registry points at
pub const BASE_URL: &str = "https://www.muscleandstrength.com";

/// Main configuration structure for Rep-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(rename = "category", default = "default_categories")]
    pub categories: Vec<CategoryConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig::default(),
            categories: default_categories(),
        }
    }
}

impl Config {
    /// Looks up a category by its registry key
    pub fn category(&self, key: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.key == key)
    }

    /// Returns the registry keys in declaration order
    pub fn category_keys(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.key.as_str()).collect()
    }
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Pause after every request, listing or detail (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Timeout applied to every individual request (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Attempts per remote call before it is given up
    #[serde(rename = "max-attempts")]
    pub max_attempts: u32,

    /// Wait between attempts of the same call (milliseconds)
    #[serde(rename = "backoff-ms")]
    pub backoff_ms: u64,

    /// Number of exhausted calls tolerated before the run is aborted
    #[serde(rename = "failure-ceiling")]
    pub failure_ceiling: u32,

    /// Successful extractions between two checkpoints
    #[serde(rename = "checkpoint-interval")]
    pub checkpoint_interval: usize,

    /// Listing pages attempted without any result before pagination gives up
    #[serde(rename = "runaway-page-limit")]
    pub runaway_page_limit: u32,

    /// Fill each record's alternatives from the harvested set
    #[serde(rename = "link-alternatives")]
    pub link_alternatives: bool,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            politeness_delay_ms: 3000,
            request_timeout_secs: 10,
            max_attempts: 3,
            backoff_ms: 5000,
            failure_ceiling: 10,
            checkpoint_interval: 5,
            runaway_page_limit: 10,
            link_alternatives: true,
        }
    }
}

impl CrawlerConfig {
    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Request header configuration
///
/// The source site serves a reduced page to unknown clients, so the
/// defaults mimic a desktop browser.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    pub accept: String,

    #[serde(rename = "accept-language")]
    pub accept_language: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            accept: "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8"
                .to_string(),
            accept_language: "en-US,en;q=0.5".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory the generated modules are written into
    pub directory: PathBuf,

    /// Import statement placed at the top of every generated module
    #[serde(rename = "type-import")]
    pub type_import: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            type_import: "import { ExerciseGroup } from '../types/exercises';".to_string(),
        }
    }
}

/// One entry of the category registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryConfig {
    /// Registry key selected on the command line
    pub key: String,

    /// Listing page of the category
    pub url: String,

    /// Human label of the body part, copied into every record
    #[serde(rename = "body-part")]
    pub body_part: String,

    /// Prefix of the generated record ids
    #[serde(rename = "id-prefix")]
    pub id_prefix: String,

    /// Module path, relative to the output directory
    #[serde(rename = "output-path")]
    pub output_path: String,

    /// Name of the exported constant in the generated module
    #[serde(rename = "variable-name")]
    pub variable_name: String,
}

impl CategoryConfig {
    pub fn new(
        key: &str,
        url: impl Into<String>,
        body_part: &str,
        id_prefix: &str,
        variable_name: &str,
    ) -> Self {
        Self {
            key: key.to_string(),
            url: url.into(),
            body_part: body_part.to_string(),
            id_prefix: id_prefix.to_string(),
            output_path: format!("{}.ts", id_prefix),
            variable_name: variable_name.to_string(),
        }
    }

    /// Final module location under the given output directory
    pub fn output_file(&self, directory: &Path) -> PathBuf {
        directory.join(&self.output_path)
    }
}

/// Built-in registry of the library's body-part categories
pub fn default_categories() -> Vec<CategoryConfig> {
    const ENTRIES: &[(&str, &str, &str, &str, &str)] = &[
        ("abs", "abs", "Abs", "abs", "absExercises"),
        ("biceps", "biceps", "Biceps", "biceps", "bicepsExercises"),
        ("chest", "chest", "Chest", "chest", "chestExercises"),
        ("shoulders", "shoulders", "Shoulders", "shoulders", "shouldersExercises"),
        ("middleBack", "middle-back", "Middle Back", "middle-back", "middleBackExercises"),
        ("adductors", "adductors.html", "Adductors", "adductors", "adductorsExercises"),
        ("abductors", "abductors.html", "Abductors", "abductors", "abductorsExercises"),
        ("calves", "calves", "Calves", "calves", "calvesExercises"),
        ("forearms", "forearms", "Forearms", "forearms", "forearmsExercises"),
        ("glutes", "glutes", "Glutes", "glutes", "glutesExercises"),
        ("hamstrings", "hamstrings", "Hamstrings", "hamstrings", "hamstringsExercises"),
        ("lats", "lats", "Lats", "lats", "latsExercises"),
        ("obliques", "obliques", "Obliques", "obliques", "obliquesExercises"),
        ("legs", "legs", "Legs", "legs", "legsExercises"),
        ("quads", "quads", "Quads", "quads", "quadsExercises"),
        ("traps", "traps", "Traps", "traps", "trapsExercises"),
        ("triceps", "triceps", "Triceps", "triceps", "tricepsExercises"),
        ("hipFlexors", "hip-flexors", "Hip Flexors", "hip-flexors", "hipFlexorsExercises"),
        ("lowerBack", "lower-back", "Lower Back", "lower-back", "lowerBackExercises"),
        ("upperBack", "upper-back", "Upper Back", "upper-back", "upperBackExercises"),
    ];

    ENTRIES
        .iter()
        .map(|(key, slug, body_part, prefix, variable)| {
            CategoryConfig::new(
                key,
                format!("{}/exercises/{}", BASE_URL, slug),
                body_part,
                prefix,
                variable,
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_keys_are_unique() {
        let categories = default_categories();
        let mut keys: Vec<_> = categories.iter().map(|c| c.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), categories.len());
        assert_eq!(categories.len(), 20);
    }

    #[test]
    fn test_category_output_path_from_prefix() {
        let config = Config::default();
        let middle_back = config.category("middleBack").unwrap();
        assert_eq!(middle_back.output_path, "middle-back.ts");
        assert_eq!(
            middle_back.url,
            "https://www.muscleandstrength.com/exercises/middle-back"
        );
        assert_eq!(
            middle_back.output_file(Path::new("out")),
            PathBuf::from("out/middle-back.ts")
        );
    }

    #[test]
    fn test_unknown_category_lookup() {
        assert!(Config::default().category("neck").is_none());
    }
}
