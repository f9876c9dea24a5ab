pub mod config;
pub mod error;
pub mod prediction;
pub mod session;

pub use config::{ClientConfig, ConfigOverrides};
pub use error::{CaptureError, ConfigError, PredictionError};
pub use prediction::{parse_prediction, with_deadline, Confidence, Prediction};
pub use session::{transition, Effect, Event, Preview, RequestId, RequestState, Session};
