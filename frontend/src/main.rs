mod api;
mod camera;
mod components;
mod config;

use camera::CameraFeed;
use components::handlers;
use components::header::render_header;
use components::preview_area::render_preview_area;
use components::results::{render_processing, render_results};
use components::upload_section::render_upload_section;
use components::utils::render_error_message;
use gloo_events::EventListener;
use gloo_file::{File as GlooFile, ObjectUrl};
use shared::{transition, ClientConfig, RequestId, Session};
use wasm_bindgen::JsCast;
use web_sys::{AbortController, ClipboardEvent, DragEvent};
use yew::prelude::*;

// Display handle and upload payload of the current image
pub type SessionState = Session<ObjectUrl, GlooFile>;
pub type SessionEvent = shared::Event<ObjectUrl, GlooFile>;
pub type SessionEffect = shared::Effect<GlooFile>;

pub struct InFlightRequest {
    pub id: RequestId,
    pub controller: AbortController,
}

// Yew msg components
pub enum Msg {
    Session(SessionEvent),
    CameraReady(CameraFeed),

    // UI states
    SetDragging(bool),

    // Input events
    HandleDrop(DragEvent),
    HandlePaste(ClipboardEvent),
}

// Main component
pub struct Model {
    pub session: SessionState,
    pub config: ClientConfig,
    pub video_ref: NodeRef,
    pub camera: Option<CameraFeed>,
    pub in_flight: Option<InFlightRequest>,
    pub is_dragging: bool,
    paste_listener: Option<EventListener>,
}

impl Component for Model {
    type Message = Msg;
    type Properties = ();

    fn create(ctx: &Context<Self>) -> Self {
        let config = config::load_config();
        log::info!(
            "Predictions go to {} with a {:?} timeout",
            config.endpoint,
            config.timeout
        );

        let mut model = Self {
            session: Session::default(),
            config,
            video_ref: NodeRef::default(),
            camera: None,
            in_flight: None,
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
        match msg {
            Msg::Session(event) => self.dispatch(ctx, event),
            Msg::CameraReady(feed) => handlers::handle_camera_ready(self, ctx, feed),

            Msg::SetDragging(is_dragging) => {
                self.is_dragging = is_dragging;
                true
            }

            Msg::HandleDrop(event) => handlers::handle_drop(self, ctx, event),
            Msg::HandlePaste(event) => handlers::handle_paste(ctx, event),
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        html! {
            <div class="container">
                { render_header() }

                <main class="main-content">
                    { render_preview_area(self, ctx) }
                    { render_upload_section(self, ctx) }
                    { render_processing(self) }
                    { render_error_message(self) }
                    { render_results(self) }
                </main>
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        if let Some(feed) = self.camera.take() {
            feed.stop();
        }
        if let Some(request) = self.in_flight.take() {
            request.controller.abort();
        }
    }
}

impl Model {
    fn dispatch(&mut self, ctx: &Context<Self>, event: SessionEvent) -> bool {
        handlers::release_finished_request(self, &event);

        let (session, effects) = transition(std::mem::take(&mut self.session), event);
        self.session = session;

        for effect in effects {
            handlers::run_effect(self, ctx, effect);
        }
        true
    }
}

fn main() {
    wasm_logger::init(wasm_logger::Config::default());
    log::info!("App starting...");
    yew::Renderer::<Model>::new().render();
}
