//! Pure transforms from server payloads to what the views render.

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{PatchPrediction, PatchPredictionSet, Prediction, Recipe, RecipeIngredient};
use strum::Display;

const FRESHNESS_PREFIXES: [&str; 2] = ["Fresh", "Rotten"];

pub const HIGH_CONFIDENCE: f32 = 0.8;
pub const MEDIUM_CONFIDENCE: f32 = 0.6;

/// `FreshApple` -> `apple`. Only one leading token is removed and the match is
/// case-sensitive, so `apple` maps to itself.
pub fn ingredient_from_label(label: &str) -> String {
    FRESHNESS_PREFIXES
        .iter()
        .find_map(|prefix| label.strip_prefix(prefix))
        .unwrap_or(label)
        .to_lowercase()
}

/// `RottenBanana` -> `Rotten Banana`.
pub fn display_label(label: &str) -> String {
    for prefix in FRESHNESS_PREFIXES {
        if let Some(rest) = label.strip_prefix(prefix) {
            if !rest.is_empty() && !rest.starts_with(' ') {
                return format!("{} {}", prefix, rest);
            }
        }
    }
    label.to_string()
}

#[derive(Display, Clone, Copy, Debug, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ConfidenceLevel {
    High,
    Medium,
    Low,
}

impl ConfidenceLevel {
    pub fn of(confidence: f32) -> Self {
        if confidence >= HIGH_CONFIDENCE {
            ConfidenceLevel::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            ConfidenceLevel::Medium
        } else {
            ConfidenceLevel::Low
        }
    }

    pub fn css_class(&self) -> String {
        format!("confidence-{}", self)
    }
}

pub fn percent(confidence: f32, decimals: usize) -> String {
    format!("{:.*}%", decimals, confidence * 100.0)
}

/// Link to the recipe page for a list of ingredient names.
pub fn recipes_link(ingredients: &[String]) -> String {
    format!("/recipes?ingredients={}", urlencoding::encode(&ingredients.join(",")))
}

/// Comma separated free text to ingredient names.
pub fn parse_ingredients(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Banner text for a failed recipe lookup. Empty input is a prompt, not a
/// fetch failure.
pub fn recipe_error_message(error: &ApiError) -> String {
    match error {
        ApiError::EmptyInput => error.to_string(),
        _ => format!("Could not fetch recipes. {}", error),
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PredictionView {
    pub title: String,
    pub confidence_text: String,
    pub level: ConfidenceLevel,
    pub runner_up: Option<String>,
    pub recipe_link: Option<String>,
}

impl From<&Prediction> for PredictionView {
    fn from(prediction: &Prediction) -> Self {
        let recipe_link = (!prediction.is_sentinel())
            .then(|| recipes_link(&[ingredient_from_label(&prediction.label)]));

        Self {
            title: display_label(&prediction.label),
            confidence_text: percent(prediction.confidence, 2),
            level: ConfidenceLevel::of(prediction.confidence),
            runner_up: prediction.second_prediction.as_ref().map(|second| {
                format!("{} ({})", display_label(&second.label), percent(second.confidence, 1))
            }),
            recipe_link,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PatchCard {
    pub patch_id: usize,
    pub label: String,
    pub confidence_text: String,
    pub level: ConfidenceLevel,
    pub image_url: Option<String>,
    pub muted: bool,
}

impl PatchCard {
    /// `fallback_id` numbers patches the server sent without an id.
    pub fn new(patch: &PatchPrediction, fallback_id: usize, config: &ApiConfig) -> Self {
        Self {
            patch_id: patch.patch_id.unwrap_or(fallback_id),
            label: display_label(&patch.label),
            confidence_text: percent(patch.confidence, 1),
            level: ConfidenceLevel::of(patch.confidence),
            image_url: patch.patch_url.as_deref().map(|url| config.absolute(url)),
            muted: patch.below_threshold,
        }
    }
}

/// Every patch is listed; `below_threshold` only mutes the card.
pub fn patch_cards(set: &PatchPredictionSet, config: &ApiConfig) -> Vec<PatchCard> {
    set.predictions
        .iter()
        .enumerate()
        .map(|(i, patch)| PatchCard::new(patch, i + 1, config))
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecipeCard {
    pub id: u64,
    pub title: String,
    pub image: Option<String>,
    pub meta: Option<String>,
    pub have: Vec<String>,
    pub need: Vec<String>,
    pub source_url: Option<String>,
}

fn ingredient_tag(ingredient: &RecipeIngredient) -> String {
    ingredient
        .original
        .as_deref()
        .filter(|s| !s.is_empty())
        .unwrap_or(&ingredient.name)
        .to_string()
}

impl From<&Recipe> for RecipeCard {
    fn from(recipe: &Recipe) -> Self {
        let meta = match (recipe.ready_in_minutes, recipe.servings) {
            (Some(minutes), Some(servings)) => Some(format!("{} min · serves {}", minutes, servings)),
            (Some(minutes), None) => Some(format!("{} min", minutes)),
            (None, Some(servings)) => Some(format!("serves {}", servings)),
            (None, None) => None,
        };

        Self {
            id: recipe.id,
            title: recipe.title.clone(),
            image: recipe.image.clone().filter(|s| !s.is_empty()),
            meta,
            have: recipe.used_ingredients.iter().map(ingredient_tag).collect(),
            need: recipe.missed_ingredients.iter().map(ingredient_tag).collect(),
            source_url: recipe.source_url.clone(),
        }
    }
}

pub fn recipe_cards(recipes: &[Recipe]) -> Vec<RecipeCard> {
    recipes.iter().map(RecipeCard::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SecondaryPrediction;

    #[test]
    fn strips_one_freshness_prefix_and_lowercases() {
        assert_eq!(ingredient_from_label("FreshApple"), "apple");
        assert_eq!(ingredient_from_label("RottenStrawberry"), "strawberry");
        assert_eq!(ingredient_from_label("FreshFreshMango"), "freshmango");
        assert_eq!(ingredient_from_label("Banana"), "banana");
    }

    #[test]
    fn extraction_is_idempotent_on_plain_names() {
        for name in ["apple", "green pepper", "freshapple", ""] {
            let once = ingredient_from_label(name);
            assert_eq!(once, name);
            assert_eq!(ingredient_from_label(&once), once);
        }
    }

    #[test]
    fn confidence_buckets() {
        assert_eq!(ConfidenceLevel::of(0.95), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::of(0.8), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::of(0.6), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::of(0.59), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::of(0.0).css_class(), "confidence-low");
    }

    #[test]
    fn display_label_splits_prefix() {
        assert_eq!(display_label("FreshApple"), "Fresh Apple");
        assert_eq!(display_label("Rotten Tomato"), "Rotten Tomato");
        assert_eq!(display_label("No Detection"), "No Detection");
    }

    #[test]
    fn sentinel_predictions_get_no_recipe_link() {
        let view = PredictionView::from(&Prediction::no_detection());
        assert_eq!(view.title, "No Detection");
        assert_eq!(view.confidence_text, "0.00%");
        assert!(view.recipe_link.is_none());

        assert!(PredictionView::from(&Prediction::error()).recipe_link.is_none());
    }

    #[test]
    fn prediction_view_links_to_recipes() {
        let prediction = Prediction {
            label: "FreshMango".into(),
            confidence: 0.912,
            bbox: None,
            second_prediction: Some(SecondaryPrediction {
                label: "RottenMango".into(),
                confidence: 0.05,
            }),
        };
        let view = PredictionView::from(&prediction);
        assert_eq!(view.title, "Fresh Mango");
        assert_eq!(view.confidence_text, "91.20%");
        assert_eq!(view.level, ConfidenceLevel::High);
        assert_eq!(view.runner_up.as_deref(), Some("Rotten Mango (5.0%)"));
        assert_eq!(view.recipe_link.as_deref(), Some("/recipes?ingredients=mango"));
    }

    #[test]
    fn below_threshold_patches_are_kept_but_muted() {
        let set = PatchPredictionSet {
            total_patches: Some(2),
            patches_above_threshold: Some(1),
            threshold: Some(0.6),
            predictions: vec![
                PatchPrediction {
                    patch_id: Some(1),
                    label: "FreshApple".into(),
                    confidence: 0.9,
                    patch_url: Some("/patches/1.png".into()),
                    below_threshold: false,
                    bbox: None,
                },
                PatchPrediction {
                    patch_id: None,
                    label: "RottenApple".into(),
                    confidence: 0.4,
                    patch_url: None,
                    below_threshold: true,
                    bbox: None,
                },
            ],
        };

        let cards = patch_cards(&set, &ApiConfig::default());
        assert_eq!(cards.len(), 2);
        assert!(!cards[0].muted);
        assert!(cards[1].muted);
        assert_eq!(cards[0].image_url.as_deref(), Some("http://localhost:8000/patches/1.png"));
        assert_eq!(cards[1].confidence_text, "40.0%");
        assert_eq!(cards[1].patch_id, 2);
    }

    #[test]
    fn soup_recipe_renders_one_have_tag() {
        let recipes: Vec<Recipe> = serde_json::from_str(
            r#"[{"id":1,"title":"Soup","usedIngredients":[{"name":"apple"}],"missedIngredients":[]}]"#,
        )
        .unwrap();

        let cards = recipe_cards(&recipes);
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].title, "Soup");
        assert_eq!(cards[0].have, vec!["apple".to_string()]);
        assert!(cards[0].need.is_empty());
        assert!(cards[0].image.is_none());
        assert!(cards[0].meta.is_none());
    }

    #[test]
    fn recipe_tags_prefer_original_text() {
        let recipes: Vec<Recipe> = serde_json::from_str(
            r#"[{"id":7,"title":"Pie","image":"https://img/pie.jpg","readyInMinutes":45,"servings":4,
                "usedIngredients":[{"name":"apple","original":"3 large apples"}],
                "missedIngredients":[{"name":"flour","original":""},{"name":"butter"}]}]"#,
        )
        .unwrap();

        let card = RecipeCard::from(&recipes[0]);
        assert_eq!(card.have, vec!["3 large apples".to_string()]);
        assert_eq!(card.need, vec!["flour".to_string(), "butter".to_string()]);
        assert_eq!(card.meta.as_deref(), Some("45 min · serves 4"));
    }

    #[test]
    fn free_text_ingredients() {
        assert_eq!(parse_ingredients(" apple, ,banana ,"), vec!["apple", "banana"]);
        assert!(parse_ingredients("  ").is_empty());
        assert_eq!(
            recipes_link(&["apple".into(), "banana".into()]),
            "/recipes?ingredients=apple%2Cbanana"
        );
    }

    #[test]
    fn empty_recipe_input_is_not_reported_as_fetch_failure() {
        assert_eq!(
            recipe_error_message(&ApiError::EmptyInput),
            "Please enter at least one ingredient."
        );
        assert_eq!(
            recipe_error_message(&ApiError::Status {
                status: 502,
                body: "bad gateway".into()
            }),
            "Could not fetch recipes. Server error: 502 - bad gateway"
        );
    }
}
