use super::recipe_list::render_recipe_list;
use super::utils::render_error_banner;
use crate::api::{GlooClient, api_config};
use shared::presentation::{recipe_cards, recipe_error_message};
use shared::{Orchestrator, Recipe};
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct RecipesPageProps {
    #[prop_or_default]
    pub initial_ingredients: Option<String>,
}

#[function_component(RecipesPage)]
pub fn recipes_page(props: &RecipesPageProps) -> Html {
    let ingredients = use_state(|| props.initial_ingredients.clone().unwrap_or_default());
    let recipes = use_state(Vec::<Recipe>::new);
    let loading = use_state(|| false);
    let error = use_state(|| None::<String>);
    let orchestrator = use_memo((), |_| Orchestrator::new(GlooClient, api_config()));

    let fetch_recipes = {
        let recipes = recipes.clone();
        let loading = loading.clone();
        let error = error.clone();
        let orchestrator = orchestrator.clone();

        Callback::from(move |input: String| {
            let recipes = recipes.clone();
            let loading = loading.clone();
            let error = error.clone();
            let orchestrator = orchestrator.clone();

            loading.set(true);
            error.set(None);

            spawn_local(async move {
                let number = orchestrator.config().recipe_count;
                match orchestrator.query_recipes(&input, number).await {
                    Ok(found) => {
                        if found.is_empty() {
                            error.set(Some("No recipes found for those ingredients.".into()));
                        }
                        recipes.set(found);
                    }
                    Err(e) => {
                        log::error!("Recipe lookup failed: {}", e);
                        recipes.set(Vec::new());
                        error.set(Some(recipe_error_message(&e)));
                    }
                }
                loading.set(false);
            });
        })
    };

    // Query passed in the URL runs once on load.
    {
        let fetch_recipes = fetch_recipes.clone();
        let initial = props.initial_ingredients.clone();
        use_effect_with(initial, move |initial| {
            if let Some(initial) = initial.clone() {
                fetch_recipes.emit(initial);
            }
            || ()
        });
    }

    let handle_input = {
        let ingredients = ingredients.clone();
        Callback::from(move |e: InputEvent| {
            let input: HtmlInputElement = e.target_unchecked_into();
            ingredients.set(input.value());
        })
    };

    let handle_submit = {
        let ingredients = ingredients.clone();
        let fetch_recipes = fetch_recipes.clone();
        Callback::from(move |_: MouseEvent| fetch_recipes.emit((*ingredients).clone()))
    };

    let handle_key = {
        let ingredients = ingredients.clone();
        let fetch_recipes = fetch_recipes.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                fetch_recipes.emit((*ingredients).clone());
            }
        })
    };

    let body = if *loading {
        html! { <div class="loading-text">{"Loading recipes..."}</div> }
    } else if !recipes.is_empty() {
        render_recipe_list(&recipe_cards(&recipes))
    } else {
        html! { <div class="empty-state"><p>{"Enter ingredients to find recipes"}</p></div> }
    };

    html! {
        <div class="container">
            <header class="app-header">
                <h1><i class="fa-solid fa-utensils"></i>{" Recipe Finder"}</h1>
                <a class="header-link" href="/">{"Back to Predictor"}</a>
            </header>

            <main class="main-content">
                <div class="recipe-search">
                    <input
                        type="text"
                        value={(*ingredients).clone()}
                        oninput={handle_input}
                        onkeypress={handle_key}
                        placeholder="e.g., apple, banana, carrot"
                    />
                    <button class="analyze-btn" onclick={handle_submit} disabled={*loading}>
                        { if *loading { "Finding..." } else { "Find Recipes" } }
                    </button>
                </div>

                {
                    if let Some(message) = &*error {
                        render_error_banner(message)
                    } else {
                        html! {}
                    }
                }

                { body }
            </main>
        </div>
    }
}
