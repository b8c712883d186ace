use super::super::Model;
use super::recipe_list::render_recipe_list;
use shared::presentation::{PatchCard, patch_cards, recipe_cards, recipes_link};
use shared::{FlowState, Summary};
use yew::prelude::*;

pub fn render_patch_results(model: &Model) -> Html {
    let Some(patches) = model.session.patches() else {
        return html! {};
    };

    let cards = patch_cards(patches, model.orchestrator.config());

    html! {
        <div class="patch-results">
            <h2>{"Patch Analysis Results"}</h2>
            <div class="patch-counts">
                <span class="count-label">{"Total Patches: "}</span>{ patches.total().to_string() }
                {" | "}
                <span class="count-label">{"Above Threshold: "}</span>{ patches.above_threshold().to_string() }
            </div>
            {
                if let Some(url) = &model.session.upload.annotated_image_url {
                    html! { <img class="annotated-image" src={url.clone()} alt="Detections" /> }
                } else {
                    html! {}
                }
            }
            <div class="patch-grid">
                { for cards.iter().map(render_patch_card) }
            </div>
            { render_summary(model) }
            { render_chained_recipes(model) }
        </div>
    }
}

fn render_patch_card(card: &PatchCard) -> Html {
    html! {
        <div
            class={classes!("patch-card", if card.muted { "below-threshold" } else { "above-threshold" })}
            key={card.patch_id.to_string()}
        >
            {
                if let Some(url) = &card.image_url {
                    html! { <img src={url.clone()} alt={format!("Patch {}", card.patch_id)} /> }
                } else {
                    html! {}
                }
            }
            <p class="patch-label">{ card.label.clone() }</p>
            <p class={card.level.css_class()}>{ card.confidence_text.clone() }</p>
            <p class="patch-id">{ format!("Patch {}", card.patch_id) }</p>
        </div>
    }
}

fn render_summary(model: &Model) -> Html {
    match (&model.session.summary, model.session.state) {
        (Some(summary), _) => render_summary_table(summary),
        (None, FlowState::Summarizing) => html! {
            <p class="loading-text"><i class="fa-solid fa-spinner fa-spin"></i>{" Summarizing..."}</p>
        },
        (None, _) => html! {},
    }
}

fn render_summary_table(summary: &Summary) -> Html {
    let items = summary
        .fresh_items
        .iter()
        .map(|item| ("fresh", item))
        .chain(summary.rotten_items.iter().map(|item| ("rotten", item)));

    html! {
        <div class="summary">
            <h3>{"Summary"}</h3>
            <div class="summary-counts">
                <span>{ format!("Items: {}", summary.total_items) }</span>
                <span class="fresh">{ format!("Fresh: {}", summary.fresh_count) }</span>
                <span class="rotten">{ format!("Rotten: {}", summary.rotten_count) }</span>
            </div>
            <ul class="summary-items">
                { for items.map(|(kind, item)| html! {
                    <li class={kind}>
                        { format!("{} {} ({:.0}%)", kind, item.name, item.confidence * 100.0) }
                    </li>
                }) }
            </ul>
            {
                if summary.ingredients_for_recipes.is_empty() {
                    html! { <p class="no-ingredients">{"No fresh ingredients to cook with."}</p> }
                } else {
                    html! {
                        <a class="recipe-link" href={recipes_link(&summary.ingredients_for_recipes)}>
                            { format!("Cook with: {}", summary.ingredients_for_recipes.join(", ")) }
                        </a>
                    }
                }
            }
        </div>
    }
}

fn render_chained_recipes(model: &Model) -> Html {
    if model.session.state == FlowState::FetchingRecipes {
        return html! {
            <p class="loading-text"><i class="fa-solid fa-spinner fa-spin"></i>{" Finding recipes..."}</p>
        };
    }

    if model.session.recipes.is_empty() {
        return html! {};
    }

    html! {
        <div class="chained-recipes">
            <h3>{"Recipe ideas"}</h3>
            { render_recipe_list(&recipe_cards(&model.session.recipes)) }
        </div>
    }
}
