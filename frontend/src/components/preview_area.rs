use super::super::{Model, Msg};
use super::utils::debounce;
use shared::{FlowState, Mode};
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(selected) = &model.session.upload.selected_file else {
        return html! {};
    };

    let link = ctx.link().clone();
    let busy = model.session.is_busy();

    let handle_threshold = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        Msg::SetThreshold(input.value().parse::<f32>().unwrap_or(shared::config::DEFAULT_THRESHOLD))
    });

    html! {
        <div id="preview-container">
            <div class="image-row">
                <div class="image-column">
                    <h3>{"Selected"}</h3>
                    { render_local_preview(model) }
                    <p class="file-name" title={selected.name.clone()}>
                        { format!("{} ({} KB)", truncate(&selected.name, 28), selected.size / 1024) }
                    </p>
                </div>
                <div class="image-column">
                    <h3>{"Uploaded Image"}</h3>
                    { render_uploaded_image(model) }
                </div>
            </div>

            <div class="threshold-selector">
                <label>{ format!("Patch threshold: {:.2}", model.threshold) }</label>
                <input
                    id="threshold-input"
                    type="range"
                    min="0.1"
                    max="0.95"
                    step="0.05"
                    value={model.threshold.to_string()}
                    disabled={busy}
                    onchange={handle_threshold}
                />
            </div>

            <div class="button-container">
                <button
                    id="clear-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    disabled={busy}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::ClearFile)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Clear"}
                </button>
                <button
                    class="analyze-btn"
                    disabled={busy}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Predict(Mode::Single))
                    })}
                >
                    { render_button_content(model, Mode::Single) }
                </button>
                <button
                    class="analyze-btn"
                    style="background-color: var(--primary-color);"
                    disabled={busy}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Predict(Mode::Many))
                    })}
                >
                    { render_button_content(model, Mode::Many) }
                </button>
            </div>
        </div>
    }
}

fn render_local_preview(model: &Model) -> Html {
    match &model.preview_url {
        Some(url) => html! {
            <img id="actual-image-preview" src={url.to_string()} alt="Selected image" />
        },
        None => html! {
            <div class="unavailable-preview">
                <p>{"Preview unavailable"}</p>
            </div>
        },
    }
}

fn render_uploaded_image(model: &Model) -> Html {
    let upload = &model.session.upload;
    match (&upload.uploaded_image_url, model.session.state) {
        (Some(url), _) => html! {
            <>
                <img class="uploaded-image" src={url.clone()} alt="Uploaded" />
                {
                    if let Some((width, height)) = upload.image_size {
                        html! { <p class="image-size">{ format!("{} × {} px", width, height) }</p> }
                    } else {
                        html! {}
                    }
                }
            </>
        },
        (None, FlowState::Uploading) => html! {
            <div class="loading-preview">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p style="margin-left: 10px;">{"Uploading..."}</p>
            </div>
        },
        (None, _) => html! {
            <div class="select-preview">
                <p>{"Upload an image to see it here"}</p>
            </div>
        },
    }
}

fn render_button_content(model: &Model, mode: Mode) -> Html {
    let running = model.session.is_busy() && model.session.mode == Some(mode);

    match (mode, running) {
        (Mode::Single, true) => html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Predicting..."}</> },
        (Mode::Many, true) => html! { <><i class="fa-solid fa-spinner fa-spin"></i>{ format!(" {}...", model.session.state.progress_label()) }</> },
        (Mode::Single, false) => html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Predict Single"}</> },
        (Mode::Many, false) => html! { <><i class="fa-solid fa-table-cells"></i>{" Predict Many Patches"}</> },
    }
}

fn truncate(name: &str, max: usize) -> String {
    if name.chars().count() > max {
        let head: String = name.chars().take(max - 3).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
