use super::super::Model;
use yew::prelude::*;

pub fn render_processing(model: &Model) -> Html {
    if !model.session.is_loading() {
        return html! {};
    }

    html! {
        <div class="spinner-container">
            <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
            <p>{"Processing image..."}</p>
        </div>
    }
}

pub fn render_results(model: &Model) -> Html {
    let Some(prediction) = model.session.result() else {
        return html! {};
    };

    let flagged = prediction.is_flagged(&model.config.flagged_label);

    html! {
        <div class={classes!(
            "results-container",
            model.session.request_state().to_string(),
            if flagged { "flagged" } else { "clear" }
        )}>
            <h2 class="result-heading">{"Prediction Result"}</h2>
            <p class="result-label">{ format!("Prediction: {}", prediction.label) }</p>
            <p class="result-confidence">{ format!("Confidence: {}", prediction.confidence_text()) }</p>
        </div>
    }
}
