mod api;
mod components;
mod route;

use api::{GlooClient, api_config};
use components::recipes_page::{RecipesPage, RecipesPageProps};
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use route::Route;
use shared::{FlowEvent, Mode, Orchestrator, Session};
use wasm_bindgen::JsCast;
use web_sys::{ClipboardEvent, DragEvent};
use yew::prelude::*;

// Yew msg components
enum Msg {
    // File operations
    FileSelected(GlooFile),
    ClearFile,

    // Prediction operations
    Predict(Mode),
    SetThreshold(f32),
    Flow(FlowEvent),

    // UI states
    SetError(Option<String>),
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Predictor page
struct Model {
    session: Session,
    file: Option<GlooFile>,
    preview_url: Option<ObjectUrl>,
    orchestrator: Orchestrator<GlooClient>,
    threshold: f32,
    error: Option<String>,
    is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = api_config();
        let mut model = Self {
            session: Session::default(),
            file: None,
            preview_url: None,
            threshold: config.threshold,
            orchestrator: Orchestrator::new(GlooClient, config),
            error: None,
            is_dragging: false,
            paste_listener: None,
        };

        let link = ctx.link().clone();
        if let Some(window) = web_sys::window() {
            let listener = EventListener::new(&window, "paste", move |event| {
                if let Some(clipboard_event) = event.dyn_ref::<ClipboardEvent>() {
                    link.send_message(Msg::HandlePaste(clipboard_event.clone()));
                }
            });
            model.paste_listener = Some(listener);
        }

        model
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use components::handlers::*;

        match msg {
            Msg::FileSelected(file) => handle_file_selected(self, file),
            Msg::ClearFile => handle_clear_file(self),

            Msg::Predict(mode) => handle_predict(self, ctx, mode),
            Msg::SetThreshold(threshold) => handle_set_threshold(self, threshold),
            Msg::Flow(event) => self.session.apply(event),

            Msg::SetError(error) => {
                self.error = error;
                true
            }
            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handle_paste(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use components::*;

        html! {
            <div class="container">
                { header::render_header() }

                <main class="main-content">
                    { upload_section::render_upload_section(self, ctx) }
                    { preview_area::render_preview_area(self, ctx) }
                    { utils::render_error_message(self) }
                    { results::render_results(self) }
                    { patches::render_patch_results(self) }
                </main>

                <footer class="app-footer">
                    <p>{"FreshLens | Rust WASM"}</p>
                </footer>
            </div>
        }
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");

    match Route::current() {
        Route::Recipes { ingredients } => {
            yew::Renderer::<RecipesPage>::with_props(RecipesPageProps {
                initial_ingredients: ingredients,
            })
            .render();
        }
        Route::Predictor => {
            yew::Renderer::<Model>::new().render();
        }
    }
}
