use super::super::Model;
use shared::presentation::PredictionView;
use yew::prelude::*;

pub fn render_results(model: &Model) -> Html {
    let Some(prediction) = model.session.prediction() else {
        return html! {};
    };

    let view = PredictionView::from(prediction);
    let filename = model
        .session
        .upload
        .selected_file
        .as_ref()
        .map_or_else(|| "Analyzed Image".to_string(), |file| file.name.clone());
    let width = prediction.confidence.clamp(0.0, 1.0) * 100.0;

    html! {
        <div class={classes!("results-container", view.level.css_class())}>
            <div class="result-header">
                <h2 title={format!("Prediction for: {}", filename)}>
                    { view.title.clone() }
                    <span class="analyzed-filename-display">{ format!("({})", filename) }</span>
                </h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", width)}></div>
                    </div>
                    <div class="meter-value">{ view.confidence_text.clone() }</div>
                </div>
            </div>
            {
                if let Some(runner_up) = &view.runner_up {
                    html! { <p class="runner-up">{ format!("Runner-up: {}", runner_up) }</p> }
                } else {
                    html! {}
                }
            }
            {
                if let Some(bbox) = prediction.bbox {
                    html! {
                        <p class="bbox">
                            { format!("Box: ({}, {}) to ({}, {}), {} × {} px", bbox.0, bbox.1, bbox.2, bbox.3, bbox.width(), bbox.height()) }
                        </p>
                    }
                } else {
                    html! {}
                }
            }
            {
                if let Some(link) = &view.recipe_link {
                    html! { <a class="recipe-link" href={link.clone()}>{"What to do with this?"}</a> }
                } else {
                    html! {}
                }
            }
        </div>
    }
}
