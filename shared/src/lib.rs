pub mod config;
pub mod error;
pub mod flow;
pub mod models;
pub mod orchestrator;
pub mod presentation;

pub use config::{ApiConfig, Endpoint};
pub use error::ApiError;
pub use flow::{Detection, FlowEvent, FlowState, Mode, SelectedFile, Session, Stage, UploadId};
pub use models::{
    BoundingBox, PatchPrediction, PatchPredictionSet, PredictResponse, Prediction, Recipe,
    RecipeIngredient, SecondaryPrediction, Summary, SummaryItem, UploadReceipt,
};
pub use orchestrator::{HttpClient, Orchestrator};
