use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-apple-whole"></i> {" Fresh or Rotten?"}</h1>
            <p class="subtitle">{"Upload a photo of your produce, then check one item or scan the whole basket"}</p>
            <a class="header-link" href="/recipes">{"Recipe Finder"}</a>
        </header>
    }
}
