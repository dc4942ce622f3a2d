//! Strict parsing of backend answers into [`CalibrationResult`].
//!
//! The backend is asked for pure JSON but may still wrap it in a fenced code
//! block. Everything else about the answer is checked field by field; a
//! missing or malformed field is an error, never a default.

use crate::calibration::{CalibrationResult, FIVE_STEPS};
use crate::error::{MirrorError, Result, ValidationErrorKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

static LEADING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("valid regex"));
static TRAILING_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\r?\n?[ \t]*```\s*$").expect("valid regex"));

const FREQUENCY_SCAN: &str = "frequencyScan";
const ILLUSION_STRIPPING: &str = "illusionStripping";
const FIVE_STEPS_FIELD: &str = "fiveSteps";
const ACTION_ANCHOR: &str = "actionAnchor";
const RECOMMENDED_BOOK_TITLE: &str = "recommendedBookTitle";
const RECOMMENDED_MUSIC_TITLE: &str = "recommendedMusicTitle";

/// Removes a surrounding code fence (```` ``` ```` or ```` ```json ````) if present.
pub fn strip_code_fence(raw: &str) -> &str {
    let start = LEADING_FENCE.find(raw).map(|m| m.end()).unwrap_or(0);
    let body = &raw[start..];
    let end = TRAILING_FENCE
        .find(body)
        .map(|m| m.start())
        .unwrap_or(body.len());
    body[..end].trim()
}

/// Parses and validates raw backend text.
pub struct ResultValidator;

impl ResultValidator {
    /// Turns raw backend text into a [`CalibrationResult`].
    ///
    /// # Errors
    ///
    /// `MirrorError::Validation` with
    /// - `MalformedJson` when the (unfenced) text is not JSON,
    /// - `MissingField` when one of the six fields is absent,
    /// - `WrongShape` when a field has the wrong type, is blank, or
    ///   `fiveSteps` does not hold exactly five non-blank strings.
    pub fn parse(raw_text: &str) -> Result<CalibrationResult> {
        let body = strip_code_fence(raw_text);

        let value: Value = serde_json::from_str(body).map_err(|e| {
            MirrorError::validation(ValidationErrorKind::MalformedJson, e.to_string(), raw_text)
        })?;

        let Value::Object(object) = value else {
            return Err(MirrorError::validation(
                ValidationErrorKind::WrongShape,
                "top-level value is not an object",
                raw_text,
            ));
        };

        let fields = Fields {
            object: &object,
            raw: raw_text,
        };

        Ok(CalibrationResult {
            frequency_scan: fields.text(FREQUENCY_SCAN)?,
            illusion_stripping: fields.text(ILLUSION_STRIPPING)?,
            five_steps: fields.steps()?,
            action_anchor: fields.text(ACTION_ANCHOR)?,
            recommended_book_title: fields.text(RECOMMENDED_BOOK_TITLE)?,
            recommended_music_title: fields.text(RECOMMENDED_MUSIC_TITLE)?,
        })
    }
}

struct Fields<'a> {
    object: &'a Map<String, Value>,
    raw: &'a str,
}

impl Fields<'_> {
    fn get(&self, name: &str) -> Result<&Value> {
        self.object.get(name).ok_or_else(|| {
            MirrorError::validation(
                ValidationErrorKind::MissingField,
                format!("missing field `{name}`"),
                self.raw,
            )
        })
    }

    fn shape_error(&self, message: String) -> MirrorError {
        MirrorError::validation(ValidationErrorKind::WrongShape, message, self.raw)
    }

    fn text(&self, name: &str) -> Result<String> {
        match self.get(name)? {
            Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
            Value::String(_) => Err(self.shape_error(format!("field `{name}` is blank"))),
            _ => Err(self.shape_error(format!("field `{name}` is not a string"))),
        }
    }

    fn steps(&self) -> Result<[String; FIVE_STEPS]> {
        let Value::Array(items) = self.get(FIVE_STEPS_FIELD)? else {
            return Err(self.shape_error(format!("field `{FIVE_STEPS_FIELD}` is not an array")));
        };

        if items.len() != FIVE_STEPS {
            return Err(self.shape_error(format!(
                "field `{FIVE_STEPS_FIELD}` has {} entries, expected {FIVE_STEPS}",
                items.len()
            )));
        }

        let steps = items
            .iter()
            .enumerate()
            .map(|(i, item)| match item {
                Value::String(s) if !s.trim().is_empty() => Ok(s.clone()),
                _ => Err(self.shape_error(format!(
                    "`{FIVE_STEPS_FIELD}[{i}]` is not a non-blank string"
                ))),
            })
            .collect::<Result<Vec<String>>>()?;

        steps
            .try_into()
            .map_err(|_| self.shape_error(format!("field `{FIVE_STEPS_FIELD}` has the wrong length")))
    }
}
