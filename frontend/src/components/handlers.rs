use super::super::{Model, Msg};
use super::utils::first_image_file;
use gloo_file::{File as GlooFile, ObjectUrl};
use js_sys::Date;
use shared::{FlowEvent, Mode, SelectedFile, UploadId};
use wasm_bindgen_futures::spawn_local;
use web_sys::{ClipboardEvent, DragEvent, FileList};
use yew::prelude::*;

pub fn handle_file_selected(model: &mut Model, file: GlooFile) -> bool {
    model.error = None;
    // Downstream results belong to the previous file.
    model.session.apply(FlowEvent::FileSelected(SelectedFile {
        name: file.name(),
        size: file.size(),
    }));
    model.preview_url = Some(ObjectUrl::from(file.clone()));
    model.file = Some(file);
    true
}

pub fn handle_clear_file(model: &mut Model) -> bool {
    model.file = None;
    model.preview_url = None;
    model.error = None;
    model.session.apply(FlowEvent::Reset);
    true
}

pub fn handle_set_threshold(model: &mut Model, threshold: f32) -> bool {
    let threshold = threshold.clamp(0.0, 1.0);
    if (model.threshold - threshold).abs() < f32::EPSILON {
        return false;
    }
    model.threshold = threshold;
    true
}

pub fn handle_predict(model: &mut Model, ctx: &Context<Model>, mode: Mode) -> bool {
    let Some(file) = model.file.clone() else {
        ctx.link()
            .send_message(Msg::SetError(Some("No file selected for analysis.".into())));
        return false;
    };

    model.error = None;
    let orchestrator = model.orchestrator.clone();
    let link = ctx.link().clone();
    let id = UploadId::generate();
    let threshold = model.threshold;
    let cache_bust = Date::now() as u64;
    log::info!("Starting {} prediction for {} as {}", mode, file.name(), id);

    spawn_local(async move {
        let emit = move |event: FlowEvent| link.send_message(Msg::Flow(event));
        match mode {
            Mode::Single => orchestrator.run_single(&file, id, cache_bust, emit).await,
            Mode::Many => {
                orchestrator
                    .run_many(&file, id, threshold, cache_bust, emit)
                    .await
            }
        }
    });

    true
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(data_transfer) = event.data_transfer() {
        if let Some(file_list) = data_transfer.files() {
            process_file_list(ctx, file_list);
        }
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(data_transfer) = event.clipboard_data() {
        if let Some(file_list) = data_transfer.files() {
            if file_list.length() > 0 {
                event.prevent_default();
                process_file_list(ctx, file_list);
                return true;
            }
        }
    }
    false
}

pub fn process_file_list(ctx: &Context<Model>, file_list: FileList) {
    match first_image_file(&file_list) {
        Some(file) => ctx.link().send_message(Msg::FileSelected(file)),
        None => {
            log::warn!("Dropped or pasted content had no image");
            ctx.link()
                .send_message(Msg::SetError(Some("No valid image file found.".into())));
        }
    }
}
