use yew::prelude::*;

/// Renders the application header
pub fn render_header() -> Html {
    html! {
        <header class="app-header">
            <h1><i class="fa-solid fa-microscope"></i> {" Image Prediction App"}</h1>
            <p class="subtitle">{"Upload an image, drop or paste one, or take a photo"}</p>
        </header>
    }
}
