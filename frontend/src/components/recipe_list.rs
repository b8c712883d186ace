use shared::presentation::RecipeCard;
use yew::prelude::*;

fn render_tags(title: &str, class: &'static str, tags: &[String]) -> Html {
    if tags.is_empty() {
        return html! {};
    }

    html! {
        <div class={classes!("ingredient-group", class)}>
            <p class="ingredient-group-title">{ title.to_string() }</p>
            <div class="tags">
                { for tags.iter().map(|tag| html! { <span class="tag">{ tag }</span> }) }
            </div>
        </div>
    }
}

fn render_recipe_card(card: &RecipeCard) -> Html {
    html! {
        <div class="recipe-card" key={card.id.to_string()}>
            {
                if let Some(image) = &card.image {
                    html! { <img src={image.clone()} alt={card.title.clone()} /> }
                } else {
                    html! {}
                }
            }
            <div class="recipe-body">
                <h3>{ card.title.clone() }</h3>
                {
                    if let Some(meta) = &card.meta {
                        html! { <p class="recipe-meta">{ meta }</p> }
                    } else {
                        html! {}
                    }
                }
                { render_tags("Have:", "have", &card.have) }
                { render_tags("Need:", "need", &card.need) }
                {
                    if let Some(url) = &card.source_url {
                        html! { <a href={url.clone()} target="_blank" rel="noopener">{"Full recipe"}</a> }
                    } else {
                        html! {}
                    }
                }
            </div>
        </div>
    }
}

pub fn render_recipe_list(cards: &[RecipeCard]) -> Html {
    html! {
        <div class="recipe-grid">
            { for cards.iter().map(render_recipe_card) }
        </div>
    }
}
