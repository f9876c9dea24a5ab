//! Acquisition and prediction state for one page session.
//!
//! The session is a plain value. [`transition`] consumes it together with an
//! [`Event`] and hands back the next session plus the [`Effect`]s the host has
//! to run (camera, network). Results of those effects come back in as events.
//!
//! `H` is whatever the host displays (an object URL in the browser) and `B` is
//! the payload that gets uploaded.

use derive_more::Display;

use crate::error::{CaptureError, PredictionError};
use crate::prediction::Prediction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, strum_macros::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum RequestState {
    #[default]
    Idle,
    InFlight,
    Succeeded,
    Failed,
    TimedOut,
}

/// Identifies one submission so that resolutions of replaced or abandoned
/// requests can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display)]
pub struct RequestId(u64);

impl RequestId {
    fn next(self) -> Self {
        RequestId(self.0.wrapping_add(1))
    }
}

/// What the image area shows.
#[derive(Debug, PartialEq, Eq)]
pub enum Preview<'a, H> {
    LiveCamera,
    Image(&'a H),
    Placeholder,
}

#[derive(Debug, Clone)]
pub struct Session<H, B> {
    captured_image: Option<H>,
    pending_file: Option<B>,
    camera_active: bool,
    request_state: RequestState,
    result: Option<Prediction>,
    error_message: Option<String>,
    capture_error: Option<String>,
    active_request: Option<RequestId>,
    last_request: RequestId,
}

impl<H, B> Default for Session<H, B> {
    fn default() -> Self {
        Self {
            captured_image: None,
            pending_file: None,
            camera_active: false,
            request_state: RequestState::Idle,
            result: None,
            error_message: None,
            capture_error: None,
            active_request: None,
            last_request: RequestId::default(),
        }
    }
}

#[derive(Debug)]
pub enum Event<H, B> {
    /// A file was picked, dropped or pasted. `None` when the picker was
    /// dismissed.
    FileSelected(Option<(H, B)>),
    CameraRequested,
    CameraFailed(CaptureError),
    CaptureRequested,
    FrameCaptured(Result<(H, B), CaptureError>),
    SubmitRequested,
    PredictionResolved {
        request_id: RequestId,
        outcome: Result<Prediction, PredictionError>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect<B> {
    StartCamera,
    StopCamera,
    CaptureFrame,
    SendPrediction { request_id: RequestId, payload: B },
    AbortPrediction { request_id: RequestId },
}

impl<H, B> Session<H, B> {
    pub fn captured_image(&self) -> Option<&H> {
        self.captured_image.as_ref()
    }

    pub fn pending_file(&self) -> Option<&B> {
        self.pending_file.as_ref()
    }

    pub fn camera_active(&self) -> bool {
        self.camera_active
    }

    pub fn request_state(&self) -> RequestState {
        self.request_state
    }

    pub fn result(&self) -> Option<&Prediction> {
        self.result.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    pub fn capture_error(&self) -> Option<&str> {
        self.capture_error.as_deref()
    }

    pub fn active_request(&self) -> Option<RequestId> {
        self.active_request
    }

    pub fn is_loading(&self) -> bool {
        self.request_state == RequestState::InFlight
    }

    pub fn has_image(&self) -> bool {
        self.captured_image.is_some()
    }

    pub fn can_submit(&self) -> bool {
        self.pending_file.is_some() && self.active_request.is_none()
    }

    /// The live feed wins over a stale captured image.
    pub fn preview(&self) -> Preview<'_, H> {
        if self.camera_active {
            Preview::LiveCamera
        } else if let Some(image) = &self.captured_image {
            Preview::Image(image)
        } else {
            Preview::Placeholder
        }
    }

    fn set_image(&mut self, (image, payload): (H, B)) {
        self.captured_image = Some(image);
        self.pending_file = Some(payload);
        self.request_state = RequestState::Idle;
        self.result = None;
        self.error_message = None;
        self.capture_error = None;
    }

    fn cancel_in_flight(&mut self, effects: &mut Vec<Effect<B>>) {
        if let Some(request_id) = self.active_request.take() {
            log::info!("Abandoning prediction request {} for a new image", request_id);
            self.request_state = RequestState::Idle;
            effects.push(Effect::AbortPrediction { request_id });
        }
    }

    fn close_camera(&mut self, effects: &mut Vec<Effect<B>>) {
        if self.camera_active {
            self.camera_active = false;
            effects.push(Effect::StopCamera);
        }
    }
}

pub fn transition<H, B: Clone>(
    mut session: Session<H, B>,
    event: Event<H, B>,
) -> (Session<H, B>, Vec<Effect<B>>) {
    let mut effects = Vec::new();

    match event {
        Event::FileSelected(None) => {}
        Event::FileSelected(Some(image)) => {
            session.cancel_in_flight(&mut effects);
            session.close_camera(&mut effects);
            session.set_image(image);
        }

        Event::CameraRequested => {
            if !session.camera_active {
                session.camera_active = true;
                session.capture_error = None;
                effects.push(Effect::StartCamera);
            }
        }
        Event::CameraFailed(err) => {
            log::warn!("Camera failed: {}", err);
            session.close_camera(&mut effects);
            session.capture_error = Some(err.user_message().to_string());
        }

        Event::CaptureRequested => {
            if session.camera_active {
                effects.push(Effect::CaptureFrame);
            } else {
                log::debug!("Capture requested without an active camera");
            }
        }
        Event::FrameCaptured(Ok(image)) => {
            if session.camera_active {
                session.cancel_in_flight(&mut effects);
                session.close_camera(&mut effects);
                session.set_image(image);
            } else {
                log::debug!("Discarding frame captured after the camera was closed");
            }
        }
        Event::FrameCaptured(Err(err)) => {
            if session.camera_active {
                log::warn!("Frame capture failed: {}", err);
                session.capture_error = Some(err.user_message().to_string());
            } else {
                log::debug!("Ignoring capture failure after the camera was closed: {}", err);
            }
        }

        Event::SubmitRequested => {
            let Some(payload) = session.pending_file.clone() else {
                return (session, effects);
            };
            if let Some(active) = session.active_request {
                log::warn!("Prediction request {} still in flight, ignoring submit", active);
                return (session, effects);
            }

            let request_id = session.last_request.next();
            session.last_request = request_id;
            session.active_request = Some(request_id);
            session.request_state = RequestState::InFlight;
            session.result = None;
            session.error_message = None;
            effects.push(Effect::SendPrediction { request_id, payload });
        }
        Event::PredictionResolved { request_id, outcome } => {
            if session.active_request != Some(request_id) {
                log::debug!("Discarding stale resolution of request {}", request_id);
                return (session, effects);
            }
            session.active_request = None;

            match outcome {
                Ok(prediction) => {
                    log::info!("Prediction {} succeeded: {}", request_id, prediction.label);
                    session.request_state = RequestState::Succeeded;
                    session.result = Some(prediction);
                }
                Err(err) => {
                    log::error!("Prediction {} failed: {}", request_id, err);
                    session.request_state = err.request_state();
                    session.error_message = Some(err.user_message().to_string());
                }
            }
        }
    }

    (session, effects)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{BUSY_MESSAGE, FAILED_MESSAGE};
    use crate::prediction::parse_prediction;

    type TestSession = Session<&'static str, Vec<u8>>;

    fn image(name: &'static str) -> (&'static str, Vec<u8>) {
        (name, name.as_bytes().to_vec())
    }

    fn run(
        session: TestSession,
        events: Vec<Event<&'static str, Vec<u8>>>,
    ) -> (TestSession, Vec<Effect<Vec<u8>>>) {
        events.into_iter().fold((session, Vec::new()), |(session, mut all), event| {
            let (session, effects) = transition(session, event);
            all.extend(effects);
            (session, all)
        })
    }

    fn submitted(name: &'static str) -> (TestSession, RequestId) {
        let (session, effects) = run(
            TestSession::default(),
            vec![Event::FileSelected(Some(image(name))), Event::SubmitRequested],
        );
        match effects.as_slice() {
            [Effect::SendPrediction { request_id, payload }] => {
                assert_eq!(payload, name.as_bytes());
                (session, *request_id)
            }
            other => panic!("unexpected effects: {:?}", other),
        }
    }

    #[test]
    fn new_session_is_idle() {
        let session = TestSession::default();
        assert_eq!(session.request_state(), RequestState::Idle);
        assert_eq!(session.preview(), Preview::Placeholder);
        assert!(!session.has_image());
        assert!(!session.can_submit());
    }

    #[test]
    fn selecting_a_file_makes_an_image_ready() {
        let (session, effects) = transition(
            TestSession::default(),
            Event::FileSelected(Some(image("mole.png"))),
        );

        assert!(effects.is_empty());
        assert_eq!(session.captured_image(), Some(&"mole.png"));
        assert_eq!(session.pending_file(), Some(&b"mole.png".to_vec()));
        assert!(!session.camera_active());
        assert_eq!(session.result(), None);
        assert_eq!(session.error_message(), None);
        assert_eq!(session.preview(), Preview::Image(&"mole.png"));
        assert!(session.can_submit());
    }

    #[test]
    fn dismissed_picker_is_a_no_op() {
        let (session, _) = transition(
            TestSession::default(),
            Event::FileSelected(Some(image("a.png"))),
        );
        let (session, effects) = transition(session, Event::FileSelected(None));

        assert!(effects.is_empty());
        assert_eq!(session.captured_image(), Some(&"a.png"));
    }

    #[test]
    fn second_selection_replaces_the_first() {
        let (session, _) = run(
            TestSession::default(),
            vec![
                Event::FileSelected(Some(image("a.png"))),
                Event::FileSelected(Some(image("b.png"))),
            ],
        );

        assert_eq!(session.captured_image(), Some(&"b.png"));
        assert_eq!(session.pending_file(), Some(&b"b.png".to_vec()));
    }

    #[test]
    fn selecting_a_file_closes_the_camera() {
        let (session, effects) = run(
            TestSession::default(),
            vec![
                Event::CameraRequested,
                Event::FileSelected(Some(image("a.png"))),
            ],
        );

        assert_eq!(effects, vec![Effect::StartCamera, Effect::StopCamera]);
        assert!(!session.camera_active());
        assert_eq!(session.preview(), Preview::Image(&"a.png"));
    }

    #[test]
    fn activating_the_camera_twice_starts_it_once() {
        let (session, effects) = run(
            TestSession::default(),
            vec![Event::CameraRequested, Event::CameraRequested],
        );

        assert!(session.camera_active());
        assert_eq!(effects, vec![Effect::StartCamera]);
    }

    #[test]
    fn live_feed_takes_priority_over_stale_image() {
        let (session, _) = run(
            TestSession::default(),
            vec![
                Event::FileSelected(Some(image("old.png"))),
                Event::CameraRequested,
            ],
        );

        assert_eq!(session.captured_image(), Some(&"old.png"));
        assert_eq!(session.preview(), Preview::LiveCamera);
    }

    #[test]
    fn capture_uses_the_encoded_frame_for_both_display_and_upload() {
        let (session, effects) = run(
            TestSession::default(),
            vec![
                Event::CameraRequested,
                Event::CaptureRequested,
                Event::FrameCaptured(Ok(image("captured.jpg"))),
            ],
        );

        assert_eq!(
            effects,
            vec![Effect::StartCamera, Effect::CaptureFrame, Effect::StopCamera]
        );
        assert!(!session.camera_active());
        assert_eq!(session.captured_image(), Some(&"captured.jpg"));
        assert_eq!(session.pending_file(), Some(&b"captured.jpg".to_vec()));
        assert_eq!(session.preview(), Preview::Image(&"captured.jpg"));
    }

    #[test]
    fn capture_without_camera_does_nothing() {
        let (session, effects) = transition(TestSession::default(), Event::CaptureRequested);
        assert!(effects.is_empty());
        assert!(!session.has_image());
    }

    #[test]
    fn missing_frame_is_reported_and_camera_stays_open() {
        let (session, effects) = run(
            TestSession::default(),
            vec![
                Event::CameraRequested,
                Event::CaptureRequested,
                Event::FrameCaptured(Err(CaptureError::NoFrame)),
            ],
        );

        assert_eq!(effects, vec![Effect::StartCamera, Effect::CaptureFrame]);
        assert!(session.camera_active());
        assert_eq!(
            session.capture_error(),
            Some(CaptureError::NoFrame.user_message())
        );
        assert_eq!(session.error_message(), None);
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn camera_failure_closes_the_preview() {
        let (session, effects) = run(
            TestSession::default(),
            vec![
                Event::CameraRequested,
                Event::CameraFailed(CaptureError::CameraUnavailable("NotAllowedError".into())),
            ],
        );

        assert_eq!(effects, vec![Effect::StartCamera, Effect::StopCamera]);
        assert!(!session.camera_active());
        assert!(session.capture_error().is_some());

        let (session, _) = transition(session, Event::CameraRequested);
        assert_eq!(session.capture_error(), None);
    }

    #[test]
    fn frame_arriving_after_camera_closed_is_discarded() {
        let (session, _) = run(
            TestSession::default(),
            vec![
                Event::CameraRequested,
                Event::FileSelected(Some(image("a.png"))),
                Event::FrameCaptured(Ok(image("late.jpg"))),
            ],
        );

        assert_eq!(session.captured_image(), Some(&"a.png"));
    }

    #[test]
    fn capture_failure_after_camera_closed_is_ignored() {
        let (session, _) = run(
            TestSession::default(),
            vec![
                Event::CameraRequested,
                Event::CaptureRequested,
                Event::FileSelected(Some(image("a.png"))),
                Event::FrameCaptured(Err(CaptureError::Encode("toBlob failed".into()))),
            ],
        );

        assert!(!session.camera_active());
        assert_eq!(session.captured_image(), Some(&"a.png"));
        assert_eq!(session.capture_error(), None);
    }

    #[test]
    fn submit_without_image_is_a_no_op() {
        let (session, effects) = transition(TestSession::default(), Event::SubmitRequested);
        assert!(effects.is_empty());
        assert_eq!(session.request_state(), RequestState::Idle);
    }

    #[test]
    fn submit_moves_to_in_flight() {
        let (session, request_id) = submitted("a.png");

        assert_eq!(session.request_state(), RequestState::InFlight);
        assert_eq!(session.active_request(), Some(request_id));
        assert!(session.is_loading());
        assert!(!session.can_submit());
        assert_eq!(session.result(), None);
        assert_eq!(session.error_message(), None);
    }

    #[test]
    fn resubmitting_while_in_flight_is_rejected() {
        let (session, request_id) = submitted("a.png");
        let (session, effects) = transition(session, Event::SubmitRequested);

        assert!(effects.is_empty());
        assert_eq!(session.active_request(), Some(request_id));
    }

    #[test]
    fn successful_prediction_is_stored() {
        let (session, request_id) = submitted("a.png");
        let outcome = parse_prediction(200, r#"{"prediction": "Lesion", "confidence": 0.92}"#);
        let (session, effects) =
            transition(session, Event::PredictionResolved { request_id, outcome });

        assert!(effects.is_empty());
        assert_eq!(session.request_state(), RequestState::Succeeded);
        assert_eq!(session.result().map(|p| p.label.as_str()), Some("Lesion"));
        assert_eq!(session.error_message(), None);
        assert_eq!(session.active_request(), None);
    }

    #[test]
    fn prediction_without_confidence_still_succeeds() {
        let (session, request_id) = submitted("a.png");
        let outcome = parse_prediction(200, r#"{"prediction": "Lesion"}"#);
        let (session, _) = transition(session, Event::PredictionResolved { request_id, outcome });

        let result = session.result().unwrap();
        assert_eq!(result.label, "Lesion");
        assert_eq!(result.confidence_text(), "");
    }

    #[test]
    fn server_error_fails_and_keeps_the_image() {
        let (session, request_id) = submitted("a.png");
        let outcome = parse_prediction(500, "Internal Server Error");
        let (session, _) = transition(session, Event::PredictionResolved { request_id, outcome });

        assert_eq!(session.request_state(), RequestState::Failed);
        assert_eq!(session.error_message(), Some(FAILED_MESSAGE));
        assert_eq!(session.result(), None);
        assert_eq!(session.captured_image(), Some(&"a.png"));
        assert!(session.can_submit());
    }

    #[test]
    fn network_failure_fails() {
        let (session, request_id) = submitted("a.png");
        let (session, _) = transition(
            session,
            Event::PredictionResolved {
                request_id,
                outcome: Err(PredictionError::Network("TypeError: Failed to fetch".into())),
            },
        );

        assert_eq!(session.request_state(), RequestState::Failed);
        assert_eq!(session.error_message(), Some(FAILED_MESSAGE));
    }

    #[test]
    fn timeout_reports_busy_server_and_ignores_late_response() {
        let (session, request_id) = submitted("a.png");
        let (session, _) = run(
            session,
            vec![
                Event::PredictionResolved {
                    request_id,
                    outcome: Err(PredictionError::TimedOut),
                },
                Event::PredictionResolved {
                    request_id,
                    outcome: parse_prediction(200, r#"{"prediction": "Lesion"}"#),
                },
            ],
        );

        assert_eq!(session.request_state(), RequestState::TimedOut);
        assert_eq!(session.error_message(), Some(BUSY_MESSAGE));
        assert_eq!(session.result(), None);
    }

    #[test]
    fn retry_after_failure_uses_a_fresh_request() {
        let (session, first) = submitted("a.png");
        let (session, effects) = run(
            session,
            vec![
                Event::PredictionResolved {
                    request_id: first,
                    outcome: Err(PredictionError::Status(503)),
                },
                Event::SubmitRequested,
            ],
        );

        let second = session.active_request().unwrap();
        assert_ne!(first, second);
        assert_eq!(session.request_state(), RequestState::InFlight);
        assert_eq!(session.error_message(), None);
        assert_eq!(
            effects,
            vec![Effect::SendPrediction {
                request_id: second,
                payload: b"a.png".to_vec()
            }]
        );
    }

    #[test]
    fn new_image_while_in_flight_abandons_the_request() {
        let (session, request_id) = submitted("a.png");
        let (session, effects) = transition(session, Event::FileSelected(Some(image("b.png"))));

        assert_eq!(effects, vec![Effect::AbortPrediction { request_id }]);
        assert_eq!(session.request_state(), RequestState::Idle);
        assert_eq!(session.active_request(), None);

        let (session, _) = transition(
            session,
            Event::PredictionResolved {
                request_id,
                outcome: parse_prediction(200, r#"{"prediction": "Lesion"}"#),
            },
        );
        assert_eq!(session.result(), None);
        assert_eq!(session.pending_file(), Some(&b"b.png".to_vec()));
    }

    #[test]
    fn new_image_after_result_clears_it() {
        let (session, request_id) = submitted("a.png");
        let (session, _) = run(
            session,
            vec![
                Event::PredictionResolved {
                    request_id,
                    outcome: parse_prediction(200, r#"{"prediction": "Lesion"}"#),
                },
                Event::CameraRequested,
                Event::FrameCaptured(Ok(image("captured.jpg"))),
            ],
        );

        assert_eq!(session.request_state(), RequestState::Idle);
        assert_eq!(session.result(), None);
        assert_eq!(session.captured_image(), Some(&"captured.jpg"));
    }

    #[test]
    fn request_state_names_are_kebab_case() {
        assert_eq!(RequestState::InFlight.to_string(), "in-flight");
        assert_eq!(RequestState::TimedOut.to_string(), "timed-out");
    }
}
