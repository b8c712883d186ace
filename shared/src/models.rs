use serde::{Deserialize, Serialize};

/// Pixel box as returned by the detector: `[x1, y1, x2, y2]`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox(pub i32, pub i32, pub i32, pub i32);

impl BoundingBox {
    pub fn width(&self) -> i32 {
        (self.2 - self.0).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.3 - self.1).max(0)
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SecondaryPrediction {
    pub label: String,
    pub confidence: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub second_prediction: Option<SecondaryPrediction>,
}

impl Prediction {
    pub const NO_DETECTION: &'static str = "No Detection";
    pub const ERROR: &'static str = "Error";

    fn sentinel(label: &str) -> Self {
        Self {
            label: label.to_string(),
            confidence: 0.0,
            bbox: None,
            second_prediction: None,
        }
    }

    pub fn no_detection() -> Self {
        Self::sentinel(Self::NO_DETECTION)
    }

    pub fn error() -> Self {
        Self::sentinel(Self::ERROR)
    }

    pub fn is_sentinel(&self) -> bool {
        self.label == Self::NO_DETECTION || self.label == Self::ERROR
    }
}

/// `/predict/` body. Only `prediction` is read; a missing or null value means
/// the classifier produced nothing.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
pub struct PredictResponse {
    #[serde(default)]
    pub prediction: Option<Prediction>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub mode: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PatchPrediction {
    #[serde(default)]
    pub patch_id: Option<usize>,
    pub label: String,
    pub confidence: f32,
    #[serde(default)]
    pub patch_url: Option<String>,
    #[serde(default)]
    pub below_threshold: bool,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct PatchPredictionSet {
    #[serde(default)]
    pub total_patches: Option<usize>,
    #[serde(default)]
    pub patches_above_threshold: Option<usize>,
    #[serde(default)]
    pub threshold: Option<f32>,
    #[serde(default)]
    pub predictions: Vec<PatchPrediction>,
}

impl PatchPredictionSet {
    /// Some detector builds omit the counters and ids and only send the list.
    /// Only absent values are filled; a zero from the server is kept.
    pub fn normalized(mut self) -> Self {
        self.total_patches = Some(self.total());
        self.patches_above_threshold = Some(self.above_threshold());
        for (i, patch) in self.predictions.iter_mut().enumerate() {
            patch.patch_id.get_or_insert(i + 1);
        }
        self
    }

    pub fn total(&self) -> usize {
        self.total_patches.unwrap_or(self.predictions.len())
    }

    pub fn above_threshold(&self) -> usize {
        self.patches_above_threshold
            .unwrap_or_else(|| self.predictions.iter().filter(|p| !p.below_threshold).count())
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SummaryItem {
    pub name: String,
    pub confidence: f32,
    #[serde(default)]
    pub bbox: Option<BoundingBox>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Summary {
    pub total_items: usize,
    pub fresh_count: usize,
    pub rotten_count: usize,
    #[serde(default)]
    pub fresh_items: Vec<SummaryItem>,
    #[serde(default)]
    pub rotten_items: Vec<SummaryItem>,
    #[serde(default)]
    pub ingredients_for_recipes: Vec<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct RecipeIngredient {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub amount: Option<f32>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub ready_in_minutes: Option<u32>,
    #[serde(default)]
    pub servings: Option<u32>,
    #[serde(default)]
    pub used_ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub missed_ingredients: Vec<RecipeIngredient>,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// `/upload/` body.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
pub struct UploadReceipt {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub image_size: Option<(u32, u32)>,
    #[serde(default)]
    pub mode: Option<String>,
    #[serde(default)]
    pub display_url: Option<String>,
    #[serde(default)]
    pub upload_id: Option<String>,
}
