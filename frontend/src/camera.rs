use gloo_file::File as GlooFile;
use js_sys::{Array, Function, Object, Promise, Reflect};
use shared::{CaptureError, ClientConfig};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, CanvasRenderingContext2d, FilePropertyBag, HtmlCanvasElement, HtmlVideoElement,
    MediaStream, MediaStreamConstraints, MediaStreamTrack,
};

// HTMLMediaElement.HAVE_CURRENT_DATA
const HAVE_CURRENT_DATA: u16 = 2;

pub fn describe_js_error(value: &JsValue) -> String {
    value
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| value.as_string())
        .unwrap_or_else(|| format!("{:?}", value))
}

/// A live `getUserMedia` stream.
#[derive(Clone)]
pub struct CameraFeed {
    stream: MediaStream,
}

impl CameraFeed {
    /// Asks for the rear-facing camera when the device has one.
    pub async fn open() -> Result<Self, CaptureError> {
        let unavailable = |e: JsValue| CaptureError::CameraUnavailable(describe_js_error(&e));

        let window = web_sys::window()
            .ok_or_else(|| CaptureError::CameraUnavailable("no global `window`".into()))?;
        let devices = window.navigator().media_devices().map_err(unavailable)?;

        let video = Object::new();
        Reflect::set(&video, &"facingMode".into(), &"environment".into()).map_err(unavailable)?;
        let constraints = MediaStreamConstraints::new();
        constraints.set_video(&video);
        constraints.set_audio(&JsValue::FALSE);

        let promise = devices
            .get_user_media_with_constraints(&constraints)
            .map_err(unavailable)?;
        let stream = JsFuture::from(promise)
            .await
            .map_err(unavailable)?
            .dyn_into::<MediaStream>()
            .map_err(|e| unavailable(e.into()))?;

        Ok(Self { stream })
    }

    pub fn attach(&self, video: &HtmlVideoElement) {
        video.set_src_object(Some(&self.stream));
        if let Err(e) = video.play() {
            log::warn!("Camera preview did not start: {}", describe_js_error(&e));
        }
    }

    pub fn stop(&self) {
        for track in self.stream.get_tracks().iter() {
            if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                track.stop();
            }
        }
    }
}

/// Snapshots the current video frame and encodes it, so the preview and the
/// upload are the same bytes.
pub async fn capture_frame(
    video: &HtmlVideoElement,
    config: &ClientConfig,
) -> Result<GlooFile, CaptureError> {
    let (width, height) = (video.video_width(), video.video_height());
    if video.ready_state() < HAVE_CURRENT_DATA || width == 0 || height == 0 {
        return Err(CaptureError::NoFrame);
    }

    let encode = |e: JsValue| CaptureError::Encode(describe_js_error(&e));

    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| CaptureError::Encode("no document".into()))?;
    let canvas = document
        .create_element("canvas")
        .map_err(encode)?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|e| encode(e.into()))?;
    canvas.set_width(width);
    canvas.set_height(height);

    let context = canvas
        .get_context("2d")
        .map_err(encode)?
        .ok_or_else(|| CaptureError::Encode("2d context unavailable".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|e| encode(e.into()))?;
    context
        .draw_image_with_html_video_element(video, 0.0, 0.0)
        .map_err(encode)?;

    let blob = canvas_to_blob(&canvas, &config.capture_mime).await?;

    let options = FilePropertyBag::new();
    options.set_type(&config.capture_mime);
    let file = web_sys::File::new_with_blob_sequence_and_options(
        &Array::of1(&blob),
        &config.capture_file_name,
        &options,
    )
    .map_err(encode)?;

    Ok(GlooFile::from(file))
}

async fn canvas_to_blob(canvas: &HtmlCanvasElement, mime: &str) -> Result<Blob, CaptureError> {
    let mut scheduled = Ok(());
    let promise = Promise::new(&mut |resolve: Function, reject: Function| {
        let on_blob = Closure::once_into_js(move |blob: JsValue| {
            let settled = if blob.is_null() {
                reject.call1(&JsValue::NULL, &"canvas produced no image".into())
            } else {
                resolve.call1(&JsValue::NULL, &blob)
            };
            if let Err(e) = settled {
                log::error!("Failed to settle frame encoding: {}", describe_js_error(&e));
            }
        });
        scheduled = canvas.to_blob_with_type(on_blob.unchecked_ref(), mime);
    });
    scheduled.map_err(|e| CaptureError::Encode(describe_js_error(&e)))?;

    JsFuture::from(promise)
        .await
        .map_err(|e| CaptureError::Encode(describe_js_error(&e)))?
        .dyn_into::<Blob>()
        .map_err(|e| CaptureError::Encode(describe_js_error(&e)))
}
