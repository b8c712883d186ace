//! The predictor page's state machine.
//!
//! All view-state lives in [`Session`] and only changes through
//! [`Session::apply`]. Async chains never touch state directly; they emit
//! [`FlowEvent`]s tagged with the upload they belong to, and events from an
//! upload that is no longer current are dropped.

use crate::models::{PatchPredictionSet, Prediction, Recipe, Summary, UploadReceipt};
use derive_more::{Display, From};
use std::fmt;
use strum::Display as StrumDisplay;

#[derive(Display, From, Clone, Debug, PartialEq, Eq, Hash)]
#[display(fmt = "{}", _0)]
pub struct UploadId(String);

impl UploadId {
    pub fn generate() -> Self {
        UploadId(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(StrumDisplay, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Single,
    Many,
}

#[derive(StrumDisplay, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Upload,
    Predict,
    Summary,
    Recipes,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowState {
    Idle,
    Uploading,
    Predicting,
    Summarizing,
    FetchingRecipes,
    Error(Stage),
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Idle => write!(f, "Idle"),
            FlowState::Uploading => write!(f, "Uploading"),
            FlowState::Predicting => write!(f, "Predicting"),
            FlowState::Summarizing => write!(f, "Summarizing"),
            FlowState::FetchingRecipes => write!(f, "FetchingRecipes"),
            FlowState::Error(stage) => write!(f, "Error({})", stage),
        }
    }
}

impl FlowState {
    pub fn is_busy(&self) -> bool {
        !matches!(self, FlowState::Idle | FlowState::Error(_))
    }

    /// Button text while a chain is running.
    pub fn progress_label(&self) -> &'static str {
        match self {
            FlowState::Uploading => "Uploading",
            FlowState::Predicting => "Predicting",
            FlowState::Summarizing => "Summarizing",
            FlowState::FetchingRecipes => "Finding recipes",
            FlowState::Idle | FlowState::Error(_) => "",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FlowEvent {
    FileSelected(SelectedFile),
    /// A predictor chain starts for `id`; everything downstream is cleared.
    Started { id: UploadId, mode: Mode },
    Uploaded {
        id: UploadId,
        receipt: UploadReceipt,
        display_url: String,
    },
    /// The server handed out its own id for the upload; later events use it.
    Rekeyed { id: UploadId, server_id: UploadId },
    PredictionReady { id: UploadId, prediction: Prediction },
    PatchesReady {
        id: UploadId,
        patches: PatchPredictionSet,
        annotated_url: String,
    },
    SummaryReady { id: UploadId, summary: Summary },
    RecipesReady { id: UploadId, recipes: Vec<Recipe> },
    Failed {
        id: UploadId,
        stage: Stage,
        message: String,
    },
    Reset,
}

impl FlowEvent {
    pub fn upload_id(&self) -> Option<&UploadId> {
        match self {
            FlowEvent::FileSelected(_) | FlowEvent::Reset => None,
            FlowEvent::Started { id, .. }
            | FlowEvent::Uploaded { id, .. }
            | FlowEvent::Rekeyed { id, .. }
            | FlowEvent::PredictionReady { id, .. }
            | FlowEvent::PatchesReady { id, .. }
            | FlowEvent::SummaryReady { id, .. }
            | FlowEvent::RecipesReady { id, .. }
            | FlowEvent::Failed { id, .. } => Some(id),
        }
    }
}

/// Next state for `event`. Events that make no sense in `state` leave it as is.
pub fn transition(state: FlowState, event: &FlowEvent) -> FlowState {
    use FlowState::*;

    match (state, event) {
        (_, FlowEvent::FileSelected(_)) | (_, FlowEvent::Reset) => Idle,
        (_, FlowEvent::Started { .. }) => Uploading,
        (Uploading, FlowEvent::Uploaded { .. }) => Predicting,
        (Predicting, FlowEvent::PredictionReady { .. }) => Idle,
        (Predicting, FlowEvent::PatchesReady { .. }) => Summarizing,
        (Summarizing, FlowEvent::SummaryReady { summary, .. }) => {
            if summary.ingredients_for_recipes.is_empty() {
                Idle
            } else {
                FetchingRecipes
            }
        }
        (FetchingRecipes, FlowEvent::RecipesReady { .. }) => Idle,
        (s, FlowEvent::Failed { stage, .. }) if s.is_busy() => Error(*stage),
        (s, _) => s,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct UploadSession {
    pub selected_file: Option<SelectedFile>,
    pub upload_id: Option<UploadId>,
    pub uploaded_image_url: Option<String>,
    pub image_size: Option<(u32, u32)>,
    pub annotated_image_url: Option<String>,
}

/// Single and patch results share one slot, so only one can be shown.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Detection {
    #[default]
    None,
    Single(Prediction),
    Many(PatchPredictionSet),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Session {
    pub state: FlowState,
    pub mode: Option<Mode>,
    pub upload: UploadSession,
    pub detection: Detection,
    pub summary: Option<Summary>,
    pub recipes: Vec<Recipe>,
    pub error: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            state: FlowState::Idle,
            mode: None,
            upload: UploadSession::default(),
            detection: Detection::None,
            summary: None,
            recipes: Vec::new(),
            error: None,
        }
    }
}

impl Session {
    pub fn prediction(&self) -> Option<&Prediction> {
        match &self.detection {
            Detection::Single(prediction) => Some(prediction),
            _ => None,
        }
    }

    pub fn patches(&self) -> Option<&PatchPredictionSet> {
        match &self.detection {
            Detection::Many(patches) => Some(patches),
            _ => None,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.state.is_busy()
    }

    fn clear_results(&mut self) {
        self.detection = Detection::None;
        self.summary = None;
        self.recipes.clear();
        self.error = None;
        self.upload.annotated_image_url = None;
    }

    fn is_current(&self, event: &FlowEvent) -> bool {
        match (event, event.upload_id()) {
            (FlowEvent::Started { .. }, _) | (_, None) => true,
            (_, Some(id)) => self.upload.upload_id.as_ref() == Some(id),
        }
    }

    /// Applies `event`. Returns `false` when the event was stale and nothing
    /// changed, which doubles as the component's re-render flag.
    pub fn apply(&mut self, event: FlowEvent) -> bool {
        if !self.is_current(&event) {
            log::debug!("Dropping stale event for upload {:?}", event.upload_id());
            return false;
        }

        let next = transition(self.state, &event);
        log::debug!("Flow {} -> {}", self.state, next);

        match event {
            FlowEvent::FileSelected(file) => {
                *self = Session::default();
                self.upload.selected_file = Some(file);
            }
            FlowEvent::Reset => {
                *self = Session::default();
            }
            FlowEvent::Started { id, mode } => {
                self.clear_results();
                self.mode = Some(mode);
                self.upload.upload_id = Some(id);
                self.upload.uploaded_image_url = None;
                self.upload.image_size = None;
            }
            FlowEvent::Uploaded {
                receipt,
                display_url,
                ..
            } => {
                self.upload.uploaded_image_url = Some(display_url);
                self.upload.image_size = receipt.image_size;
            }
            FlowEvent::Rekeyed { server_id, .. } => {
                self.upload.upload_id = Some(server_id);
            }
            FlowEvent::PredictionReady { prediction, .. } => {
                self.detection = Detection::Single(prediction);
            }
            FlowEvent::PatchesReady {
                patches,
                annotated_url,
                ..
            } => {
                self.detection = Detection::Many(patches);
                self.upload.annotated_image_url = Some(annotated_url);
            }
            FlowEvent::SummaryReady { summary, .. } => {
                self.summary = Some(summary);
            }
            FlowEvent::RecipesReady { recipes, .. } => {
                self.recipes = recipes;
            }
            FlowEvent::Failed { stage, message, .. } => {
                if stage == Stage::Predict && self.mode == Some(Mode::Single) {
                    self.detection = Detection::Single(Prediction::error());
                }
                self.error = Some(message);
            }
        }

        self.state = next;
        true
    }
}
