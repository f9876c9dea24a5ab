use super::super::{Model, Msg};
use shared::Preview;
use web_sys::DragEvent;
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let link = ctx.link();

    let handle_drag_over = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(true)
    });

    let handle_drag_leave = link.callback(|e: DragEvent| {
        e.prevent_default();
        Msg::SetDragging(false)
    });

    let handle_drop = link.callback(Msg::HandleDrop);

    html! {
        <div
            id="drop-zone"
            class={classes!("image-container", model.is_dragging.then_some("drag-over"))}
            ondragover={handle_drag_over}
            ondragleave={handle_drag_leave}
            ondrop={handle_drop}
        >
            { render_selected_image_preview(model) }
        </div>
    }
}

fn render_selected_image_preview(model: &Model) -> Html {
    match model.session.preview() {
        Preview::LiveCamera => html! {
            <div class="camera-container">
                <video
                    ref={model.video_ref.clone()}
                    class="webcam"
                    autoplay=true
                    playsinline=true
                    muted=true
                />
                <div class="grid-overlay">
                    { for (0..9).map(|_| html! { <div class="grid-cell"></div> }) }
                </div>
            </div>
        },
        Preview::Image(url) => html! {
            <img id="actual-image-preview" class="image-frame" src={url.to_string()} alt="Selected" />
        },
        Preview::Placeholder => html! {
            <div class="placeholder">
                <p>{"No image selected"}</p>
            </div>
        },
    }
}
