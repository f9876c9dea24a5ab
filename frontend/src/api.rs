use gloo_console::error;
use gloo_file::File as GlooFile;
use gloo_net::http::Request;
use shared::{parse_prediction, ClientConfig, Prediction, PredictionError};
use web_sys::{AbortSignal, FormData};

use crate::camera::describe_js_error;

/// Posts the image as the only multipart field. `signal` lets the caller
/// abort the underlying fetch once the deadline passes.
pub async fn send_prediction(
    config: &ClientConfig,
    file: &GlooFile,
    signal: &AbortSignal,
) -> Result<Prediction, PredictionError> {
    let form_data =
        FormData::new().map_err(|e| PredictionError::Network(describe_js_error(&e)))?;
    form_data
        .append_with_blob(&config.form_field, file.as_ref())
        .map_err(|e| PredictionError::Network(describe_js_error(&e)))?;

    let response = Request::post(&config.endpoint)
        .abort_signal(Some(signal))
        .body(form_data)
        .map_err(|e| PredictionError::Network(e.to_string()))?
        .send()
        .await
        .map_err(|e| {
            let err = transport_error(e);
            if err.is_aborted() {
                log::debug!("Prediction request aborted");
            } else {
                error!(format!("Error uploading image: {}", err));
            }
            err
        })?;

    if !response.ok() {
        return Err(PredictionError::Status(response.status()));
    }

    let body = response
        .text()
        .await
        .map_err(transport_error)?;
    parse_prediction(response.status(), &body)
}

fn transport_error(e: gloo_net::Error) -> PredictionError {
    match e {
        gloo_net::Error::JsError(js) => PredictionError::from_transport(&js.name, &js.message),
        other => PredictionError::Network(other.to_string()),
    }
}
