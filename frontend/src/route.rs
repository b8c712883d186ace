use web_sys::UrlSearchParams;

pub const RECIPES_PATH: &str = "/recipes";

/// Which page the current URL asks for.
#[derive(Clone, Debug, PartialEq)]
pub enum Route {
    Predictor,
    Recipes { ingredients: Option<String> },
}

impl Route {
    pub fn current() -> Self {
        let Some(location) = web_sys::window().map(|window| window.location()) else {
            return Route::Predictor;
        };

        let path = location.pathname().unwrap_or_default();
        if path.trim_end_matches('/') != RECIPES_PATH {
            return Route::Predictor;
        }

        let ingredients = location
            .search()
            .ok()
            .and_then(|search| UrlSearchParams::new_with_str(&search).ok())
            .and_then(|params| params.get("ingredients"))
            .filter(|value| !value.trim().is_empty());

        Route::Recipes { ingredients }
    }
}
