//! Where the inference service lives and how request URLs are built.

pub const DEV_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_THRESHOLD: f32 = 0.6;
pub const DEFAULT_RECIPE_COUNT: u32 = 2;

const LOOPBACK_HOSTS: [&str; 4] = ["localhost", "127.0.0.1", "0.0.0.0", "[::1]"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Upload,
    Display,
    Predict,
    PredictMany,
    Visualize,
    Summary,
    Recipes,
}

impl Endpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Endpoint::Upload => "/upload/",
            Endpoint::Display => "/display/",
            Endpoint::Predict => "/predict/",
            Endpoint::PredictMany => "/predict_many/",
            Endpoint::Visualize => "/visualize/",
            Endpoint::Summary => "/summary/",
            Endpoint::Recipes => "/api/recipes/",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    pub threshold: f32,
    pub recipe_count: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::with_base_url(DEV_API_URL)
    }
}

impl ApiConfig {
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            threshold: DEFAULT_THRESHOLD,
            recipe_count: DEFAULT_RECIPE_COUNT,
        }
    }

    /// Picks the base URL: an explicit override wins, loopback pages talk to
    /// the local dev server, anything else goes to `api.<hostname>`.
    pub fn resolve(override_url: Option<&str>, page_hostname: Option<&str>) -> Self {
        if let Some(url) = override_url.map(str::trim).filter(|u| !u.is_empty()) {
            return Self::with_base_url(url);
        }

        match page_hostname.map(str::trim).filter(|h| !h.is_empty()) {
            Some(host) if !LOOPBACK_HOSTS.contains(&host) => {
                let host = host.strip_prefix("www.").unwrap_or(host);
                Self::with_base_url(&format!("https://api.{}", host))
            }
            _ => Self::default(),
        }
    }

    pub fn url(&self, endpoint: Endpoint, params: &[(&str, String)]) -> String {
        let mut url = format!("{}{}", self.base_url, endpoint.path());
        let query = params
            .iter()
            .map(|(key, value)| format!("{}={}", key, urlencoding::encode(value)))
            .collect::<Vec<_>>()
            .join("&");
        if !query.is_empty() {
            url.push('?');
            url.push_str(&query);
        }
        url
    }

    /// Turns a server-relative path such as `/patches/3.png` into an absolute URL.
    pub fn absolute(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loopback_pages_use_dev_server() {
        assert_eq!(ApiConfig::resolve(None, Some("localhost")).base_url, DEV_API_URL);
        assert_eq!(ApiConfig::resolve(None, Some("127.0.0.1")).base_url, DEV_API_URL);
        assert_eq!(ApiConfig::resolve(None, None).base_url, DEV_API_URL);
    }

    #[test]
    fn public_host_maps_to_api_subdomain() {
        let config = ApiConfig::resolve(None, Some("www.freshlens.dev"));
        assert_eq!(config.base_url, "https://api.freshlens.dev");
    }

    #[test]
    fn override_wins_and_drops_trailing_slash() {
        let config = ApiConfig::resolve(Some("http://10.0.0.5:9000/"), Some("freshlens.dev"));
        assert_eq!(config.base_url, "http://10.0.0.5:9000");
    }

    #[test]
    fn query_values_are_encoded() {
        let config = ApiConfig::default();
        let url = config.url(
            Endpoint::Recipes,
            &[("ingredients", "apple,green pepper".into()), ("number", "2".into())],
        );
        assert_eq!(
            url,
            "http://localhost:8000/api/recipes/?ingredients=apple%2Cgreen%20pepper&number=2"
        );
        assert_eq!(config.url(Endpoint::Summary, &[]), "http://localhost:8000/summary/");
    }

    #[test]
    fn relative_paths_are_joined_to_base() {
        let config = ApiConfig::default();
        assert_eq!(config.absolute("/patches/1.png"), "http://localhost:8000/patches/1.png");
        assert_eq!(config.absolute("display/"), "http://localhost:8000/display/");
        assert_eq!(config.absolute("https://cdn.x/y.png"), "https://cdn.x/y.png");
    }
}
