use super::super::{InFlightRequest, Model, Msg, SessionEffect, SessionEvent};
use super::utils::first_image_file;
use crate::api::send_prediction;
use crate::camera::{self, CameraFeed};
use gloo_file::{File as GlooFile, ObjectUrl};
use gloo_timers::future::TimeoutFuture;
use shared::{with_deadline, CaptureError, Effect, Event, PredictionError, RequestId};
use wasm_bindgen_futures::spawn_local;
use web_sys::{AbortController, ClipboardEvent, DragEvent, HtmlVideoElement};
use yew::prelude::*;

pub fn selected(file: GlooFile) -> SessionEvent {
    let preview_url = ObjectUrl::from(file.clone());
    Event::FileSelected(Some((preview_url, file)))
}

pub fn run_effect(model: &mut Model, ctx: &Context<Model>, effect: SessionEffect) {
    match effect {
        Effect::StartCamera => start_camera(ctx),
        Effect::StopCamera => stop_camera(model),
        Effect::CaptureFrame => capture_frame(model, ctx),
        Effect::SendPrediction { request_id, payload } => {
            send_prediction_request(model, ctx, request_id, payload)
        }
        Effect::AbortPrediction { request_id } => abort_prediction(model, request_id),
    }
}

/// Forgets the abort handle once its request has resolved.
pub fn release_finished_request(model: &mut Model, event: &SessionEvent) {
    if let Event::PredictionResolved { request_id, .. } = event {
        if model.in_flight.as_ref().is_some_and(|r| r.id == *request_id) {
            model.in_flight = None;
        }
    }
}

pub fn handle_camera_ready(model: &mut Model, ctx: &Context<Model>, feed: CameraFeed) -> bool {
    if !model.session.camera_active() {
        log::debug!("Camera opened after the preview was dismissed");
        feed.stop();
        return false;
    }

    match model.video_ref.cast::<HtmlVideoElement>() {
        Some(video) => {
            feed.attach(&video);
            if let Some(previous) = model.camera.replace(feed) {
                previous.stop();
            }
            true
        }
        None => {
            feed.stop();
            ctx.link().send_message(Msg::Session(Event::CameraFailed(
                CaptureError::CameraUnavailable("preview element missing".into()),
            )));
            false
        }
    }
}

pub fn handle_drop(model: &mut Model, ctx: &Context<Model>, event: DragEvent) -> bool {
    event.prevent_default();
    model.is_dragging = false;

    if let Some(file) = event
        .data_transfer()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_image_file(&file_list))
    {
        ctx.link().send_message(Msg::Session(selected(file)));
    }

    true
}

pub fn handle_paste(ctx: &Context<Model>, event: ClipboardEvent) -> bool {
    if let Some(file) = event
        .clipboard_data()
        .and_then(|data_transfer| data_transfer.files())
        .and_then(|file_list| first_image_file(&file_list))
    {
        event.prevent_default();
        ctx.link().send_message(Msg::Session(selected(file)));
        return true;
    }
    false
}

fn start_camera(ctx: &Context<Model>) {
    let link = ctx.link().clone();
    spawn_local(async move {
        match CameraFeed::open().await {
            Ok(feed) => link.send_message(Msg::CameraReady(feed)),
            Err(e) => link.send_message(Msg::Session(Event::CameraFailed(e))),
        }
    });
}

fn stop_camera(model: &mut Model) {
    if let Some(feed) = model.camera.take() {
        feed.stop();
    }
}

fn capture_frame(model: &Model, ctx: &Context<Model>) {
    let link = ctx.link().clone();
    let Some(video) = model.video_ref.cast::<HtmlVideoElement>() else {
        link.send_message(Msg::Session(Event::FrameCaptured(Err(CaptureError::NoFrame))));
        return;
    };
    let config = model.config.clone();

    spawn_local(async move {
        let captured = camera::capture_frame(&video, &config)
            .await
            .map(|file| (ObjectUrl::from(file.clone()), file));
        link.send_message(Msg::Session(Event::FrameCaptured(captured)));
    });
}

fn send_prediction_request(
    model: &mut Model,
    ctx: &Context<Model>,
    request_id: RequestId,
    file: GlooFile,
) {
    let link = ctx.link().clone();
    let controller = match AbortController::new() {
        Ok(controller) => controller,
        Err(e) => {
            let outcome = Err(PredictionError::Network(camera::describe_js_error(&e)));
            link.send_message(Msg::Session(Event::PredictionResolved { request_id, outcome }));
            return;
        }
    };

    model.in_flight = Some(InFlightRequest {
        id: request_id,
        controller: controller.clone(),
    });
    let config = model.config.clone();

    spawn_local(async move {
        log::info!("Sending prediction request {} to {}", request_id, config.endpoint);
        let signal = controller.signal();
        let deadline = TimeoutFuture::new(config.timeout_millis());
        let outcome = with_deadline(send_prediction(&config, &file, &signal), deadline).await;

        if matches!(outcome, Err(PredictionError::TimedOut)) {
            log::warn!(
                "Prediction request {} exceeded {:?}, aborting",
                request_id,
                config.timeout
            );
            controller.abort();
        }

        link.send_message(Msg::Session(Event::PredictionResolved { request_id, outcome }));
    });
}

fn abort_prediction(model: &mut Model, request_id: RequestId) {
    if let Some(request) = model.in_flight.take_if(|r| r.id == request_id) {
        request.controller.abort();
    }
}
