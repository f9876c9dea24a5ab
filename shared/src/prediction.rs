use std::fmt;
use std::future::Future;
use std::pin::pin;

use futures::future::{select, Either};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use serde_json::value::RawValue;

use crate::error::PredictionError;

/// Confidence is shown exactly as the server sent it. Numbers keep their
/// original JSON text, so `0.9200` stays `0.9200`.
#[derive(Clone, Debug, PartialEq)]
pub enum Confidence {
    Number(String),
    Text(String),
}

impl Confidence {
    fn from_json(raw: &str) -> Result<Self, String> {
        let raw = raw.trim();
        if raw.starts_with('"') {
            return serde_json::from_str(raw)
                .map(Confidence::Text)
                .map_err(|e| e.to_string());
        }
        serde_json::from_str::<serde_json::Number>(raw)
            .map(|_| Confidence::Number(raw.to_string()))
            .map_err(|_| format!("confidence must be a number or string, got `{}`", raw))
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Confidence::Number(n) => f.write_str(n),
            Confidence::Text(s) => f.write_str(s),
        }
    }
}

fn deserialize_confidence<'de, D>(deserializer: D) -> Result<Option<Confidence>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Box<RawValue>> = Option::deserialize(deserializer)?;
    raw.map(|raw| Confidence::from_json(raw.get()).map_err(de::Error::custom))
        .transpose()
}

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Prediction {
    #[serde(rename = "prediction")]
    pub label: String,
    #[serde(default, deserialize_with = "deserialize_confidence")]
    pub confidence: Option<Confidence>,
}

impl Prediction {
    /// Empty when the server omitted the confidence.
    pub fn confidence_text(&self) -> String {
        self.confidence
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_default()
    }

    pub fn is_flagged(&self, flagged_label: &str) -> bool {
        self.label == flagged_label
    }
}

pub fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

pub fn parse_prediction(status: u16, body: &str) -> Result<Prediction, PredictionError> {
    if !is_success(status) {
        return Err(PredictionError::Status(status));
    }
    serde_json::from_str(body).map_err(|e| PredictionError::Malformed(e.to_string()))
}

/// Races `request` against `deadline`. Whichever finishes second is dropped
/// before this returns, so a late timer can never fire after a response and
/// a late response can never be observed after the deadline.
pub async fn with_deadline<T, R, D>(request: R, deadline: D) -> Result<T, PredictionError>
where
    R: Future<Output = Result<T, PredictionError>>,
    D: Future<Output = ()>,
{
    let request = pin!(request);
    let deadline = pin!(deadline);

    match select(request, deadline).await {
        Either::Left((outcome, _deadline)) => outcome,
        Either::Right(((), _request)) => Err(PredictionError::TimedOut),
    }
}
