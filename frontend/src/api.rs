use gloo_file::File as GlooFile;
use gloo_net::http::{Request, Response};
use serde::de::DeserializeOwned;
use shared::{ApiConfig, ApiError, HttpClient};

/// `fetch`-backed client for the inference service.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct GlooClient;

/// Base URL from the build environment, otherwise derived from the page host.
pub fn api_config() -> ApiConfig {
    let hostname = web_sys::window().and_then(|window| window.location().hostname().ok());
    let config = ApiConfig::resolve(option_env!("FRESHLENS_API_URL"), hostname.as_deref());
    log::info!("Using inference service at {}", config.base_url);
    config
}

fn network_error(url: &str, err: impl std::fmt::Display) -> ApiError {
    gloo_console::error!(format!("Request to {} failed: {}", url, err));
    ApiError::Network(err.to_string())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    if !response.ok() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        log::warn!("{} returned {}", response.url(), status);
        return Err(ApiError::Status { status, body });
    }

    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

impl HttpClient for GlooClient {
    type File = GlooFile;

    async fn post_file<T: DeserializeOwned>(
        &self,
        url: &str,
        field: &str,
        file: &GlooFile,
    ) -> Result<T, ApiError> {
        let form_data = web_sys::FormData::new().map_err(|e| network_error(url, format!("{:?}", e)))?;
        form_data
            .append_with_blob_and_filename(field, file.as_ref(), &file.name())
            .map_err(|e| network_error(url, format!("{:?}", e)))?;

        let request = Request::post(url)
            .body(form_data)
            .map_err(|e| network_error(url, e))?;
        let response = request.send().await.map_err(|e| network_error(url, e))?;
        read_json(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, ApiError> {
        let response = Request::get(url)
            .send()
            .await
            .map_err(|e| network_error(url, e))?;
        read_json(response).await
    }
}
