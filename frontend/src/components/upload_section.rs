use super::super::{Model, Msg, SessionEvent};
use super::handlers::selected;
use super::utils::{debounce, first_image_file};
use wasm_bindgen::JsCast;
use web_sys::HtmlInputElement;
use yew::prelude::*;

pub fn render_upload_section(model: &Model, ctx: &Context<Model>) -> Html {
    html! {
        <div class="upload-section">
            <div class="button-container">
                { render_file_input(ctx) }
                { render_camera_button(model, ctx) }
            </div>
            { render_predict_button(model, ctx) }
        </div>
    }
}

fn render_file_input(ctx: &Context<Model>) -> Html {
    let link = ctx.link();
    let handle_change = link.callback(|e: Event| {
        let input: HtmlInputElement = e.target_unchecked_into();
        let file = input.files().as_ref().and_then(first_image_file);

        input.set_value("");

        Msg::Session(file.map_or(SessionEvent::FileSelected(None), selected))
    });

    let trigger_file_input = Callback::from(|_| {
        if let Some(input) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("file-input"))
        {
            if let Ok(html_input) = input.dyn_into::<web_sys::HtmlElement>() {
                html_input.click();
            }
        }
    });

    html! {
        <>
            <input
                type="file"
                id="file-input"
                accept="image/*"
                style="display: none;"
                onchange={handle_change}
            />

            <button
                id="upload-button"
                class="action-btn"
                onclick={debounce(300, move || trigger_file_input.emit(()))}
            >
                <i class="fa-solid fa-upload"></i> {" Upload Image"}
            </button>
        </>
    }
}

fn render_camera_button(model: &Model, ctx: &Context<Model>) -> Html {
    let camera_active = model.session.camera_active();
    let onclick = ctx.link().callback(move |_: MouseEvent| {
        if camera_active {
            Msg::Session(SessionEvent::CaptureRequested)
        } else {
            Msg::Session(SessionEvent::CameraRequested)
        }
    });

    html! {
        <button id="camera-button" class="action-btn" {onclick}>
            {
                if camera_active {
                    html! { <>{"Capture Photo"}</> }
                } else {
                    html! { <><i class="fa-solid fa-camera"></i>{" Use Camera"}</> }
                }
            }
        </button>
    }
}

fn render_predict_button(model: &Model, ctx: &Context<Model>) -> Html {
    if !model.session.has_image() {
        return html! {};
    }

    let link = ctx.link().clone();

    html! {
        <button
            id="predict-button"
            class="predict-btn"
            onclick={debounce(300, move || link.send_message(Msg::Session(SessionEvent::SubmitRequested)))}
            disabled={!model.session.can_submit()}
        >
            <i class="fa-solid fa-magnifying-glass"></i>{" Get Prediction"}
        </button>
    }
}
