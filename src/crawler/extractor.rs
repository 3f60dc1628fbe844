//! Detail page extraction
//!
//! Maps one exercise detail page onto an [`ExerciseRecord`]. The source
//! markup is inconsistent between pages, so each field is read through a
//! fallback chain: an ordered list of named, pure strategies where the
//! first one producing a value wins. When every strategy comes up empty the
//! field's default is used, and the [`ExtractionReport`] says so.
//!
//! Difficulty, type and equipment come from the stats block, whose rows are
//! matched by exact label text against [`ProfileLabel`]; unknown rows are
//! ignored.

use crate::crawler::fetcher::Transport;
use crate::crawler::parser::{
    collapse_whitespace, element_text, parse_selector, select_attr, select_text, select_texts,
};
use crate::crawler::retry::RetryController;
use crate::model::{classify_popularity, parse_view_count, record_id, ExerciseRecord};
use crate::{ExtractionError, ScraperError};
use scraper::{ElementRef, Html};
use std::collections::HashMap;

/// Suffix the site appends to every exercise heading
const NAME_SUFFIX: &str = " Video Exercise Guide";

pub const DEFAULT_DESCRIPTION: &str = "No description available";
pub const DEFAULT_STEP: &str = "No instructions available";
pub const DEFAULT_TIPS: [&str; 3] = [
    "Maintain proper form throughout the exercise.",
    "Start with a lighter weight to practice the movement pattern.",
    "Breathe out during the exertion phase of the exercise.",
];

/// Navigation text that leaks into tip lists
const TIP_NOISE: [&str; 3] = ["Shop", "Account", "View All"];

/// Identity and category context of one detail page
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    pub url: &'a str,
    /// 1-based discovery order
    pub ordinal: usize,
    pub id_prefix: &'a str,
    pub body_part: &'a str,
}

/// One named step of a fallback chain
pub struct Strategy<T> {
    pub name: &'static str,
    pub extract: fn(&Html) -> Option<T>,
}

/// Runs a chain and returns the first value with the name of its strategy
pub fn run_chain<T>(document: &Html, chain: &[Strategy<T>]) -> Option<(T, &'static str)> {
    chain
        .iter()
        .find_map(|strategy| (strategy.extract)(document).map(|value| (value, strategy.name)))
}

/// Where a field's value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    Strategy(&'static str),
    Default,
}

/// An extracted record plus the provenance of each chained field
#[derive(Debug, Clone)]
pub struct ExtractionReport {
    pub record: ExerciseRecord,
    pub sources: Vec<(&'static str, FieldSource)>,
}

impl ExtractionReport {
    pub fn source_of(&self, field: &str) -> Option<FieldSource> {
        self.sources
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, source)| *source)
    }

    /// Fields that fell back to their default value
    pub fn defaulted_fields(&self) -> Vec<&'static str> {
        self.sources
            .iter()
            .filter(|(_, source)| *source == FieldSource::Default)
            .map(|(name, _)| *name)
            .collect()
    }
}

fn chained<T>(
    document: &Html,
    field: &'static str,
    chain: &[Strategy<T>],
    sources: &mut Vec<(&'static str, FieldSource)>,
) -> Option<T> {
    match run_chain(document, chain) {
        Some((value, strategy)) => {
            tracing::debug!("{}: extracted with '{}'", field, strategy);
            sources.push((field, FieldSource::Strategy(strategy)));
            Some(value)
        }
        None => {
            sources.push((field, FieldSource::Default));
            None
        }
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    (!items.is_empty()).then_some(items)
}

fn clean_name(raw: &str) -> Option<String> {
    let name = raw.replace(NAME_SUFFIX, "");
    let name = name.trim();
    (!name.is_empty()).then(|| name.to_string())
}

// ===== Name =====

const NAME_CHAIN: &[Strategy<String>] = &[
    Strategy {
        name: "h1",
        extract: name_from_heading,
    },
    Strategy {
        name: "og:title",
        extract: name_from_open_graph,
    },
    Strategy {
        name: "title",
        extract: name_from_title,
    },
];

fn name_from_heading(document: &Html) -> Option<String> {
    select_texts(document, "h1")
        .into_iter()
        .next()
        .and_then(|text| clean_name(&text))
}

fn name_from_open_graph(document: &Html) -> Option<String> {
    select_attr(document, "meta[property='og:title']", "content").and_then(|text| clean_name(&text))
}

fn name_from_title(document: &Html) -> Option<String> {
    let title = select_texts(document, "title").into_iter().next()?;
    let title = title.split(" | ").next().unwrap_or_default();
    clean_name(title)
}

// ===== Description =====

const DESCRIPTION_CHAIN: &[Strategy<String>] = &[
    Strategy {
        name: "overview",
        extract: description_from_overview,
    },
    Strategy {
        name: "description field",
        extract: description_from_field,
    },
];

fn description_from_overview(document: &Html) -> Option<String> {
    select_text(document, ".field-name-field-exercise-overview .field-item")
        .map(|text| collapse_whitespace(&text))
}

fn description_from_field(document: &Html) -> Option<String> {
    select_text(document, ".field-name-field-exercise-description")
        .map(|text| collapse_whitespace(&text))
}

// ===== Steps =====

const STEPS_CHAIN: &[Strategy<Vec<String>>] = &[
    Strategy {
        name: "ordered list",
        extract: steps_from_list,
    },
    Strategy {
        name: "body paragraphs",
        extract: steps_from_paragraphs,
    },
];

fn steps_from_list(document: &Html) -> Option<Vec<String>> {
    non_empty(select_texts(document, ".field-name-body .field-item ol li"))
}

fn steps_from_paragraphs(document: &Html) -> Option<Vec<String>> {
    non_empty(select_texts(document, ".field-name-body .field-item p"))
}

// ===== Tips =====

const TIPS_CHAIN: &[Strategy<Vec<String>>] = &[
    Strategy {
        name: "tips field",
        extract: tips_from_field,
    },
    Strategy {
        name: "tips heading list",
        extract: tips_from_heading_list,
    },
    Strategy {
        name: "tips heading paragraphs",
        extract: tips_from_heading_paragraphs,
    },
];

fn is_tip(text: &str) -> bool {
    !text.is_empty() && !TIP_NOISE.iter().any(|noise| text.contains(noise))
}

fn tips_from_field(document: &Html) -> Option<Vec<String>> {
    let tips = select_texts(
        document,
        ".field-name-field-exercise-tips .field-item li, .field-name-field-exercise-tips .field-item p",
    );
    non_empty(tips.into_iter().filter(|tip| is_tip(tip)).collect())
}

fn is_section_heading(element: &ElementRef<'_>) -> bool {
    matches!(element.value().name(), "h2" | "h3" | "h4")
}

/// Elements following each heading that mentions tips, up to the next heading
fn tip_sections(document: &Html) -> Vec<Vec<ElementRef<'_>>> {
    let Some(heading_selector) = parse_selector("h2, h3, h4") else {
        return Vec::new();
    };

    document
        .select(&heading_selector)
        .filter(|heading| element_text(*heading).contains("Tips"))
        .map(|heading| {
            heading
                .next_siblings()
                .filter_map(ElementRef::wrap)
                .take_while(|sibling| !is_section_heading(sibling))
                .collect()
        })
        .collect()
}

fn tips_from_heading_list(document: &Html) -> Option<Vec<String>> {
    let item_selector = parse_selector("li")?;
    let tips = tip_sections(document)
        .into_iter()
        .flatten()
        .flat_map(|element| element.select(&item_selector).map(element_text).collect::<Vec<_>>())
        .filter(|tip| is_tip(tip))
        .collect();
    non_empty(tips)
}

fn tips_from_heading_paragraphs(document: &Html) -> Option<Vec<String>> {
    let tips = tip_sections(document)
        .into_iter()
        .flatten()
        .filter(|element| element.value().name() == "p")
        .map(element_text)
        .filter(|tip| is_tip(tip))
        .collect();
    non_empty(tips)
}

// ===== Media and views =====

const VIDEO_CHAIN: &[Strategy<String>] = &[Strategy {
    name: "video iframe",
    extract: video_from_iframe,
}];

fn video_from_iframe(document: &Html) -> Option<String> {
    select_attr(document, ".video iframe", "src")
}

const IMAGE_CHAIN: &[Strategy<String>] = &[
    Strategy {
        name: "node image",
        extract: image_from_node,
    },
    Strategy {
        name: "target muscles image",
        extract: image_from_target_muscles,
    },
];

fn image_from_node(document: &Html) -> Option<String> {
    select_attr(document, ".node-image img", "src")
}

fn image_from_target_muscles(document: &Html) -> Option<String> {
    select_attr(document, ".target-muscles img", "src")
}

const VIEWS_CHAIN: &[Strategy<String>] = &[
    Strategy {
        name: "node meta",
        extract: views_from_meta,
    },
    Strategy {
        name: "count",
        extract: views_from_count,
    },
];

fn views_from_meta(document: &Html) -> Option<String> {
    views_text(document, ".node-meta span")
}

fn views_from_count(document: &Html) -> Option<String> {
    views_text(document, ".count")
}

/// Last matching element mentioning views, minus the word itself
fn views_text(document: &Html, css: &str) -> Option<String> {
    select_texts(document, css)
        .into_iter()
        .filter(|text| text.contains("Views"))
        .last()
        .map(|text| text.replace("Views", "").trim().to_string())
}

// ===== Stats block =====

/// Stats-block rows the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProfileLabel {
    TargetMuscleGroup,
    ExerciseType,
    EquipmentRequired,
    Mechanics,
    ForceType,
    ExperienceLevel,
    SecondaryMuscles,
}

impl ProfileLabel {
    pub const ALL: [ProfileLabel; 7] = [
        Self::TargetMuscleGroup,
        Self::ExerciseType,
        Self::EquipmentRequired,
        Self::Mechanics,
        Self::ForceType,
        Self::ExperienceLevel,
        Self::SecondaryMuscles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TargetMuscleGroup => "Target Muscle Group",
            Self::ExerciseType => "Exercise Type",
            Self::EquipmentRequired => "Equipment Required",
            Self::Mechanics => "Mechanics",
            Self::ForceType => "Force Type",
            Self::ExperienceLevel => "Experience Level",
            Self::SecondaryMuscles => "Secondary Muscles",
        }
    }

    /// Exact label match; anything else is not a known row
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|known| known.as_str() == label)
    }
}

/// Values of the known stats-block rows
#[derive(Debug, Clone, Default)]
pub struct ProfileData {
    values: HashMap<ProfileLabel, String>,
}

fn scoped_text(element: ElementRef<'_>, css: &str) -> String {
    let Some(selector) = parse_selector(css) else {
        return String::new();
    };
    element
        .select(&selector)
        .map(element_text)
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ProfileData {
    pub fn parse(document: &Html) -> Self {
        let mut values = HashMap::new();
        let (Some(row_selector), Some(label_selector)) = (
            parse_selector(".node-stats-block li"),
            parse_selector(".row-label"),
        ) else {
            return Self { values };
        };

        for row in document.select(&row_selector) {
            let Some(raw_label) = row.select(&label_selector).next().map(element_text) else {
                continue;
            };
            let Some(label) = ProfileLabel::from_label(&raw_label) else {
                tracing::trace!("Ignoring unknown stats row '{}'", raw_label);
                continue;
            };

            let value = match label {
                ProfileLabel::TargetMuscleGroup => scoped_text(row, ".field-item a"),
                ProfileLabel::SecondaryMuscles => scoped_text(row, ".field-type-list-text"),
                _ => collapse_whitespace(&element_text(row).replacen(&raw_label, "", 1)),
            };
            values.insert(label, value);
        }

        Self { values }
    }

    /// Non-empty value of a row
    pub fn get(&self, label: ProfileLabel) -> Option<&str> {
        self.values
            .get(&label)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }
}

fn secondary_muscles(value: Option<&str>) -> Vec<String> {
    match value {
        Some(value) if value != "None" => value
            .split(',')
            .map(str::trim)
            .filter(|muscle| !muscle.is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

fn contraindications(body_part: &str, force_type: Option<&str>, mechanics: Option<&str>) -> Vec<String> {
    let mut items = vec![
        format!("{} injury", body_part),
        "Joint pain".to_string(),
        "Acute pain during movement".to_string(),
    ];
    if force_type.is_some_and(|force| force.contains("Push")) {
        items.push("Shoulder impingement".to_string());
    }
    if mechanics == Some("Compound") {
        items.push("Recent surgery".to_string());
        items.push("Severe cardiovascular issues (for heavy compound movements)".to_string());
    }
    items
}

/// Fewer reps for compound free-weight strength work
fn recommended_repetitions(types: &[String], equipment: &[String], mechanics: Option<&str>) -> u32 {
    let free_weight = equipment
        .iter()
        .any(|item| matches!(item.to_lowercase().as_str(), "barbell" | "dumbbell"));
    if types.iter().any(|t| t == "strength") && free_weight && mechanics == Some("Compound") {
        8
    } else {
        12
    }
}

fn profile_field(
    profile: &ProfileData,
    label: ProfileLabel,
    field: &'static str,
    sources: &mut Vec<(&'static str, FieldSource)>,
) -> Option<String> {
    let value = profile.get(label).map(str::to_string);
    let source = if value.is_some() {
        FieldSource::Strategy("stats block")
    } else {
        FieldSource::Default
    };
    sources.push((field, source));
    value
}

/// Maps detail page markup onto a record
///
/// Fails only when the page body is empty; every missing field falls back
/// to its default.
pub fn extract_record(
    html: &str,
    context: &ExtractContext<'_>,
) -> Result<ExtractionReport, ExtractionError> {
    if html.trim().is_empty() {
        return Err(ExtractionError::EmptyBody {
            url: context.url.to_string(),
        });
    }

    let document = Html::parse_document(html);
    let mut sources = Vec::new();

    let name = chained(&document, "name", NAME_CHAIN, &mut sources)
        .unwrap_or_else(|| format!("Exercise {}", context.ordinal));

    let description = chained(&document, "description", DESCRIPTION_CHAIN, &mut sources)
        .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    let steps = chained(&document, "steps", STEPS_CHAIN, &mut sources)
        .unwrap_or_else(|| vec![DEFAULT_STEP.to_string()]);
    let tips = chained(&document, "tips", TIPS_CHAIN, &mut sources)
        .unwrap_or_else(|| DEFAULT_TIPS.iter().map(|tip| tip.to_string()).collect());
    let video_url = chained(&document, "videoUrl", VIDEO_CHAIN, &mut sources);
    let image_url = chained(&document, "imageUrl", IMAGE_CHAIN, &mut sources);
    let view_count =
        chained(&document, "viewCount", VIEWS_CHAIN, &mut sources).and_then(|text| parse_view_count(&text));

    let profile = ProfileData::parse(&document);
    let difficulty = profile_field(&profile, ProfileLabel::ExperienceLevel, "difficulty", &mut sources)
        .map(|level| level.to_lowercase())
        .unwrap_or_else(|| "beginner".to_string());
    let exercise_types = vec![profile_field(
        &profile,
        ProfileLabel::ExerciseType,
        "exerciseType",
        &mut sources,
    )
    .map(|kind| kind.to_lowercase())
    .unwrap_or_else(|| "strength".to_string())];
    let equipment = vec![profile_field(
        &profile,
        ProfileLabel::EquipmentRequired,
        "equipment",
        &mut sources,
    )
    .unwrap_or_else(|| "None".to_string())];

    let force_type = profile.get(ProfileLabel::ForceType).map(str::to_string);
    let mechanics = profile.get(ProfileLabel::Mechanics).map(str::to_string);

    let mut muscles = vec![profile
        .get(ProfileLabel::TargetMuscleGroup)
        .unwrap_or(context.body_part)
        .to_string()];
    muscles.extend(secondary_muscles(profile.get(ProfileLabel::SecondaryMuscles)));

    let record = ExerciseRecord {
        id: record_id(context.id_prefix, context.ordinal),
        name,
        description,
        target_body_parts: vec![context.body_part.to_string()],
        contraindications: contraindications(
            context.body_part,
            force_type.as_deref(),
            mechanics.as_deref(),
        ),
        repetitions: Some(recommended_repetitions(
            &exercise_types,
            &equipment,
            mechanics.as_deref(),
        )),
        sets: Some(3),
        rest_between_sets: Some(60),
        exercise_types,
        difficulty,
        equipment,
        steps,
        tips,
        muscles,
        alternatives: Vec::new(),
        force_type,
        mechanics,
        video_url,
        image_url,
        view_count,
        popularity: classify_popularity(view_count),
    };

    Ok(ExtractionReport { record, sources })
}

/// Fetches detail pages and extracts them through the retry controller
pub struct DetailExtractor<'a> {
    transport: &'a Transport,
}

impl<'a> DetailExtractor<'a> {
    pub fn new(transport: &'a Transport) -> Self {
        Self { transport }
    }

    async fn fetch_and_extract(
        &self,
        context: &ExtractContext<'_>,
    ) -> Result<ExtractionReport, ScraperError> {
        let html = self.transport.fetch_html(context.url).await?;
        Ok(extract_record(&html, context)?)
    }

    /// Fetches and extracts one detail page
    ///
    /// The politeness pause runs whether or not the fetch succeeded.
    /// Failures are returned as errors; folding them into a placeholder
    /// record is up to the caller.
    pub async fn fetch_record(
        &self,
        retry: &mut RetryController,
        context: &ExtractContext<'_>,
    ) -> Result<ExtractionReport, ScraperError> {
        tracing::info!("Fetching details for exercise at {}", context.url);
        let label = format!("exercise {} ({})", context.ordinal, context.url);

        let result = retry.run(&label, || self.fetch_and_extract(context)).await;
        self.transport.pause().await;

        if let Ok(report) = &result {
            let defaulted = report.defaulted_fields();
            if !defaulted.is_empty() {
                tracing::debug!("{}: defaulted {:?}", report.record.name, defaulted);
            }
        }
        result
    }
}
