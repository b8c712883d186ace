//! Upload, predict, summarize, fetch recipes.
//!
//! Every chain is strictly sequential: each request is awaited before the next
//! one is built, and the first failure ends the chain. Progress is reported as
//! [`FlowEvent`]s through the `emit` callback so the caller's reducer stays the
//! only owner of view-state.

use crate::config::{ApiConfig, Endpoint};
use crate::error::ApiError;
use crate::flow::{FlowEvent, Mode, Stage, UploadId};
use crate::models::{PatchPredictionSet, PredictResponse, Prediction, Recipe, Summary, UploadReceipt};
use crate::presentation::parse_ingredients;
use serde::de::DeserializeOwned;

pub const UPLOAD_FIELD: &str = "file";

/// The HTTP calls the flows need. The browser build implements it on top of
/// `fetch`; tests use a recording fake.
#[allow(async_fn_in_trait)]
pub trait HttpClient {
    type File;

    async fn post_file<T: DeserializeOwned>(
        &self,
        url: &str,
        field: &str,
        file: &Self::File,
    ) -> Result<T, ApiError>;

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError>;
}

#[derive(Clone, Debug)]
pub struct Orchestrator<C> {
    client: C,
    config: ApiConfig,
}

impl<C: HttpClient> Orchestrator<C> {
    pub fn new(client: C, config: ApiConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn session_params(id: &UploadId) -> Vec<(&'static str, String)> {
        vec![("session", id.to_string())]
    }

    pub fn display_url(&self, id: &UploadId, cache_bust: u64) -> String {
        self.config.url(
            Endpoint::Display,
            &[("t", cache_bust.to_string()), ("session", id.to_string())],
        )
    }

    pub fn annotated_url(&self, id: &UploadId, threshold: f32, cache_bust: u64) -> String {
        self.config.url(
            Endpoint::Visualize,
            &[
                ("threshold", threshold.to_string()),
                ("t", cache_bust.to_string()),
                ("session", id.to_string()),
            ],
        )
    }

    /// Uploads `file` under `id`. Returns the id later calls must use, or
    /// `None` after emitting the failure.
    pub async fn upload(
        &self,
        file: &C::File,
        id: UploadId,
        cache_bust: u64,
        emit: &mut impl FnMut(FlowEvent),
    ) -> Option<UploadId> {
        let url = self.config.url(Endpoint::Upload, &Self::session_params(&id));

        let receipt = match self.client.post_file::<UploadReceipt>(&url, UPLOAD_FIELD, file).await {
            Ok(receipt) => receipt,
            Err(e) => {
                log::warn!("Upload {} failed: {}", id, e);
                emit(FlowEvent::Failed {
                    id,
                    stage: Stage::Upload,
                    message: format!("Upload failed. {}", e),
                });
                return None;
            }
        };

        let id = match receipt.upload_id.as_deref().filter(|s| !s.is_empty()) {
            Some(server_id) if server_id != id.as_str() => {
                let server_id = UploadId::from(server_id.to_string());
                emit(FlowEvent::Rekeyed {
                    id,
                    server_id: server_id.clone(),
                });
                server_id
            }
            _ => id,
        };

        log::info!("Uploaded image as {}", id);
        let display_url = self.display_url(&id, cache_bust);
        emit(FlowEvent::Uploaded {
            id: id.clone(),
            receipt,
            display_url,
        });
        Some(id)
    }

    /// upload -> `/predict/`.
    pub async fn run_single(
        &self,
        file: &C::File,
        id: UploadId,
        cache_bust: u64,
        mut emit: impl FnMut(FlowEvent),
    ) {
        emit(FlowEvent::Started {
            id: id.clone(),
            mode: Mode::Single,
        });

        let Some(id) = self.upload(file, id, cache_bust, &mut emit).await else {
            return;
        };

        let url = self.config.url(Endpoint::Predict, &Self::session_params(&id));
        match self.client.get_json::<PredictResponse>(&url).await {
            Ok(response) => {
                let prediction = response
                    .prediction
                    .filter(|p| !p.label.is_empty())
                    .unwrap_or_else(Prediction::no_detection);
                log::info!("Single prediction: {} ({:.3})", prediction.label, prediction.confidence);
                emit(FlowEvent::PredictionReady { id, prediction });
            }
            Err(e) => {
                log::error!("Prediction failed: {}", e);
                emit(FlowEvent::Failed {
                    id,
                    stage: Stage::Predict,
                    message: e.to_string(),
                });
            }
        }
    }

    /// upload -> `/predict_many/` -> `/summary/` -> `/api/recipes/` when the
    /// summary lists fresh ingredients.
    pub async fn run_many(
        &self,
        file: &C::File,
        id: UploadId,
        threshold: f32,
        cache_bust: u64,
        mut emit: impl FnMut(FlowEvent),
    ) {
        emit(FlowEvent::Started {
            id: id.clone(),
            mode: Mode::Many,
        });

        let Some(id) = self.upload(file, id, cache_bust, &mut emit).await else {
            return;
        };

        let url = self.config.url(
            Endpoint::PredictMany,
            &[("threshold", threshold.to_string()), ("session", id.to_string())],
        );
        let patches = match self.client.get_json::<PatchPredictionSet>(&url).await {
            Ok(patches) => patches.normalized(),
            Err(e) => {
                log::error!("Patch prediction failed: {}", e);
                emit(FlowEvent::Failed {
                    id,
                    stage: Stage::Predict,
                    message: format!("Prediction failed. {}", e),
                });
                return;
            }
        };
        log::info!(
            "{} patches, {} above threshold {}",
            patches.total(),
            patches.above_threshold(),
            threshold
        );

        let annotated_url = self.annotated_url(&id, threshold, cache_bust);
        emit(FlowEvent::PatchesReady {
            id: id.clone(),
            patches,
            annotated_url,
        });

        let url = self.config.url(Endpoint::Summary, &Self::session_params(&id));
        let summary = match self.client.get_json::<Summary>(&url).await {
            Ok(summary) => summary,
            Err(e) => {
                log::error!("Summary failed: {}", e);
                emit(FlowEvent::Failed {
                    id,
                    stage: Stage::Summary,
                    message: format!("Could not load summary. {}", e),
                });
                return;
            }
        };

        let ingredients = summary.ingredients_for_recipes.clone();
        emit(FlowEvent::SummaryReady {
            id: id.clone(),
            summary,
        });

        if ingredients.is_empty() {
            log::info!("No fresh ingredients detected, skipping recipe lookup");
            return;
        }

        match self.recipes(&ingredients, self.config.recipe_count).await {
            Ok(recipes) => emit(FlowEvent::RecipesReady { id, recipes }),
            Err(e) => emit(FlowEvent::Failed {
                id,
                stage: Stage::Recipes,
                message: format!("Could not fetch recipes. {}", e),
            }),
        }
    }

    pub async fn recipes(&self, ingredients: &[String], number: u32) -> Result<Vec<Recipe>, ApiError> {
        if ingredients.is_empty() {
            return Err(ApiError::EmptyInput);
        }

        let url = self.config.url(
            Endpoint::Recipes,
            &[("ingredients", ingredients.join(",")), ("number", number.to_string())],
        );
        let recipes = self.client.get_json::<Vec<Recipe>>(&url).await?;
        log::info!("{} recipes for {}", recipes.len(), ingredients.join(","));
        Ok(recipes)
    }

    /// Recipe lookup from free text such as `"apple, banana"`.
    pub async fn query_recipes(&self, input: &str, number: u32) -> Result<Vec<Recipe>, ApiError> {
        self.recipes(&parse_ingredients(input), number).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{Detection, FlowState, Session};
    use futures::executor::block_on;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const PATCHES: &str = r#"{
        "total_patches": 3,
        "patches_above_threshold": 2,
        "predictions": [
            {"patch_id": 1, "label": "FreshApple", "confidence": 0.91, "patch_url": "/patches/1.png", "below_threshold": false},
            {"patch_id": 2, "label": "FreshBanana", "confidence": 0.74, "patch_url": "/patches/2.png", "below_threshold": false},
            {"patch_id": 3, "label": "RottenTomato", "confidence": 0.41, "patch_url": "/patches/3.png", "below_threshold": true}
        ]
    }"#;

    const SUMMARY: &str = r#"{
        "total_items": 3, "fresh_count": 2, "rotten_count": 1,
        "ingredients_for_recipes": ["apple", "banana"]
    }"#;

    const EMPTY_SUMMARY: &str = r#"{
        "total_items": 1, "fresh_count": 0, "rotten_count": 1,
        "ingredients_for_recipes": []
    }"#;

    const SOUP: &str =
        r#"[{"id":1,"title":"Soup","usedIngredients":[{"name":"apple"}],"missedIngredients":[]}]"#;

    /// Answers by endpoint path and records every URL it was asked for.
    #[derive(Default)]
    struct FakeClient {
        responses: HashMap<&'static str, Result<String, ApiError>>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeClient {
        fn respond(mut self, endpoint: Endpoint, body: &str) -> Self {
            self.responses.insert(endpoint.path(), Ok(body.to_string()));
            self
        }

        fn fail(mut self, endpoint: Endpoint, error: ApiError) -> Self {
            self.responses.insert(endpoint.path(), Err(error));
            self
        }

        fn answer<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
            self.calls.borrow_mut().push(url.to_string());
            let path = url
                .trim_start_matches(crate::config::DEV_API_URL)
                .split('?')
                .next()
                .unwrap_or_default();
            match self.responses.get(path) {
                Some(Ok(body)) => {
                    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
                }
                Some(Err(e)) => Err(e.clone()),
                None => Err(ApiError::Status {
                    status: 404,
                    body: "Not Found".into(),
                }),
            }
        }

        fn paths(&self) -> Vec<String> {
            self.calls
                .borrow()
                .iter()
                .map(|url| {
                    url.trim_start_matches(crate::config::DEV_API_URL)
                        .split('?')
                        .next()
                        .unwrap_or_default()
                        .to_string()
                })
                .collect()
        }
    }

    impl HttpClient for FakeClient {
        type File = String;

        async fn post_file<T: DeserializeOwned>(
            &self,
            url: &str,
            field: &str,
            _file: &String,
        ) -> Result<T, ApiError> {
            assert_eq!(field, "file");
            self.answer(url)
        }

        async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
            self.answer(url)
        }
    }

    fn orchestrator(client: FakeClient) -> Orchestrator<FakeClient> {
        Orchestrator::new(client, ApiConfig::default())
    }

    fn run_many(orchestrator: &Orchestrator<FakeClient>) -> (Session, Vec<FlowEvent>) {
        let mut session = Session::default();
        let mut events = Vec::new();
        block_on(orchestrator.run_many(
            &"basket.jpg".to_string(),
            UploadId::from("u1".to_string()),
            0.6,
            42,
            |event| {
                events.push(event.clone());
                session.apply(event);
            },
        ));
        (session, events)
    }

    fn run_single(orchestrator: &Orchestrator<FakeClient>) -> Session {
        let mut session = Session::default();
        block_on(orchestrator.run_single(
            &"apple.jpg".to_string(),
            UploadId::from("u1".to_string()),
            42,
            |event| {
                session.apply(event);
            },
        ));
        session
    }

    #[test]
    fn many_mode_runs_every_stage_in_order() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, r#"{"message":"Image uploaded successfully","image_size":[640,480]}"#)
                .respond(Endpoint::PredictMany, PATCHES)
                .respond(Endpoint::Summary, SUMMARY)
                .respond(Endpoint::Recipes, SOUP),
        );

        let (session, _) = run_many(&o);

        assert_eq!(
            o.client.paths(),
            vec!["/upload/", "/predict_many/", "/summary/", "/api/recipes/"]
        );
        let calls = o.client.calls.borrow();
        assert_eq!(calls[0], "http://localhost:8000/upload/?session=u1");
        assert_eq!(calls[1], "http://localhost:8000/predict_many/?threshold=0.6&session=u1");
        assert_eq!(calls[3], "http://localhost:8000/api/recipes/?ingredients=apple%2Cbanana&number=2");

        assert_eq!(session.state, FlowState::Idle);
        assert_eq!(session.patches().map(|p| p.predictions.len()), Some(3));
        assert_eq!(session.summary.as_ref().map(|s| s.fresh_count), Some(2));
        assert_eq!(session.recipes.len(), 1);
        assert_eq!(session.upload.image_size, Some((640, 480)));
        assert_eq!(
            session.upload.annotated_image_url.as_deref(),
            Some("http://localhost:8000/visualize/?threshold=0.6&t=42&session=u1")
        );
        assert_eq!(
            session.upload.uploaded_image_url.as_deref(),
            Some("http://localhost:8000/display/?t=42&session=u1")
        );
    }

    #[test]
    fn no_recipe_request_without_fresh_ingredients() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, "{}")
                .respond(Endpoint::PredictMany, PATCHES)
                .respond(Endpoint::Summary, EMPTY_SUMMARY)
                .respond(Endpoint::Recipes, SOUP),
        );

        let (session, _) = run_many(&o);

        assert_eq!(o.client.paths(), vec!["/upload/", "/predict_many/", "/summary/"]);
        assert!(session.recipes.is_empty());
        assert_eq!(session.state, FlowState::Idle);
    }

    #[test]
    fn failed_upload_sends_no_prediction_request() {
        let upload_error = ApiError::Status {
            status: 400,
            body: "File must be an image".into(),
        };
        let o = orchestrator(
            FakeClient::default()
                .fail(Endpoint::Upload, upload_error.clone())
                .respond(Endpoint::Predict, r#"{"prediction":{"label":"FreshApple","confidence":0.9}}"#)
                .respond(Endpoint::PredictMany, PATCHES),
        );

        let session = run_single(&o);
        assert_eq!(o.client.paths(), vec!["/upload/"]);
        assert_eq!(session.state, FlowState::Error(Stage::Upload));
        assert_eq!(session.detection, Detection::None);
        assert_eq!(
            session.error.as_deref(),
            Some("Upload failed. Server error: 400 - File must be an image")
        );

        let (session, _) = run_many(&o);
        assert_eq!(o.client.paths(), vec!["/upload/", "/upload/"]);
        assert_eq!(session.detection, Detection::None);
    }

    #[test]
    fn empty_prediction_payload_becomes_no_detection() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, "{}")
                .respond(Endpoint::Predict, r#"{"predictions":[]}"#),
        );

        let session = run_single(&o);
        assert_eq!(session.prediction(), Some(&Prediction::no_detection()));
        assert_eq!(session.state, FlowState::Idle);
        assert!(session.error.is_none());
    }

    #[test]
    fn single_prediction_is_mapped() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, "{}")
                .respond(
                    Endpoint::Predict,
                    r#"{"prediction":{"label":"RottenBanana","confidence":0.83,"bbox":null,
                        "second_prediction":{"label":"FreshBanana","confidence":0.1}},"count":1,"mode":"single"}"#,
                ),
        );

        let session = run_single(&o);
        let prediction = session.prediction().cloned().unwrap();
        assert_eq!(prediction.label, "RottenBanana");
        assert_eq!(prediction.second_prediction.unwrap().label, "FreshBanana");
        assert_eq!(o.client.calls.borrow()[1], "http://localhost:8000/predict/?session=u1");
    }

    #[test]
    fn undecodable_prediction_becomes_error_sentinel() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, "{}")
                .respond(Endpoint::Predict, "not json"),
        );

        let session = run_single(&o);
        assert_eq!(session.prediction(), Some(&Prediction::error()));
        assert_eq!(session.state, FlowState::Error(Stage::Predict));
    }

    #[test]
    fn summary_failure_stops_chain_and_keeps_patches() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, "{}")
                .respond(Endpoint::PredictMany, PATCHES)
                .fail(Endpoint::Summary, ApiError::Network("connection reset".into())),
        );

        let (session, events) = run_many(&o);

        assert_eq!(o.client.paths(), vec!["/upload/", "/predict_many/", "/summary/"]);
        assert!(session.patches().is_some());
        assert!(session.summary.is_none());
        assert_eq!(session.state, FlowState::Error(Stage::Summary));
        assert!(matches!(events.last(), Some(FlowEvent::Failed { stage: Stage::Summary, .. })));
    }

    #[test]
    fn recipe_failure_keeps_summary() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, "{}")
                .respond(Endpoint::PredictMany, PATCHES)
                .respond(Endpoint::Summary, SUMMARY)
                .fail(
                    Endpoint::Recipes,
                    ApiError::Status {
                        status: 502,
                        body: "Bad Gateway".into(),
                    },
                ),
        );

        let (session, _) = run_many(&o);
        assert!(session.summary.is_some());
        assert!(session.recipes.is_empty());
        assert_eq!(session.state, FlowState::Error(Stage::Recipes));
    }

    #[test]
    fn server_issued_upload_id_is_used_downstream() {
        let o = orchestrator(
            FakeClient::default()
                .respond(Endpoint::Upload, r#"{"upload_id":"srv-7"}"#)
                .respond(Endpoint::Predict, r#"{"prediction":{"label":"FreshApple","confidence":0.9}}"#),
        );

        let session = run_single(&o);
        assert_eq!(o.client.calls.borrow()[1], "http://localhost:8000/predict/?session=srv-7");
        assert_eq!(session.upload.upload_id, Some(UploadId::from("srv-7".to_string())));
        assert!(session.prediction().is_some());
    }

    #[test]
    fn patch_counters_are_filled_when_missing() {
        let o = orchestrator(
            FakeClient::default().respond(Endpoint::Upload, "{}").respond(
                Endpoint::PredictMany,
                r#"{"predictions":[{"label":"FreshApple","confidence":0.9,"bbox":[1,2,30,40]}],"threshold":0.5}"#,
            ),
        );

        let (session, _) = run_many(&o);
        let patches = session.patches().cloned().unwrap();
        assert_eq!(patches.total_patches, Some(1));
        assert_eq!(patches.patches_above_threshold, Some(1));
        assert_eq!(patches.predictions[0].patch_id, Some(1));
        assert_eq!(patches.predictions[0].bbox.map(|b| b.width()), Some(29));
    }

    #[test]
    fn empty_recipe_input_issues_no_request() {
        let o = orchestrator(FakeClient::default().respond(Endpoint::Recipes, SOUP));

        assert_eq!(block_on(o.query_recipes(" , ", 2)), Err(ApiError::EmptyInput));
        assert!(o.client.paths().is_empty());

        let recipes = block_on(o.query_recipes("apple, banana", 5)).unwrap();
        assert_eq!(recipes[0].title, "Soup");
        assert_eq!(
            o.client.calls.borrow()[0],
            "http://localhost:8000/api/recipes/?ingredients=apple%2Cbanana&number=5"
        );
    }
}
