// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Request body validation.
//!
//! Request types declare their rules with `#[derive(Validate)]`; handlers turn
//! the outcome into either the validated value or `AppError::Validation`.
//! Bodies that do not even deserialize are reported the same way through
//! [`JsonBody`].

use crate::error::{AppError, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::Json;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;
use validator::{Validate, ValidationErrors};

/// Message used when a rule carries no message of its own.
const DEFAULT_MESSAGE: &str = "Invalid value";

/// One rejected request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub path: String,
    pub msg: String,
    pub location: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            msg: msg.into(),
            location: "body".to_string(),
        }
    }
}

/// Collect every rule failure of `input`, ordered by field name.
pub fn failures<T: Validate>(input: &T) -> Vec<FieldError> {
    match input.validate() {
        Ok(()) => Vec::new(),
        Err(errors) => flatten(&errors),
    }
}

fn flatten(errors: &ValidationErrors) -> Vec<FieldError> {
    let mut out: Vec<FieldError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| DEFAULT_MESSAGE.to_string());
                FieldError::new(field.clone(), msg)
            })
        })
        .collect();
    out.sort_by(|a, b| a.path.cmp(&b.path));
    out
}

/// `Ok(())` when nothing failed, otherwise the collected failures.
pub fn into_result(errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Validate `input` and hand it back on success.
pub fn validated<T: Validate>(input: T) -> Result<T> {
    into_result(failures(&input))?;
    Ok(input)
}

/// JSON body extractor whose rejections are validation failures (400
/// `{errors}`) instead of axum's plain-text 4xx.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonBody<T>(pub T);

impl<S, T> FromRequest<S> for JsonBody<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Request body rejected");
        AppError::Validation(vec![rejection_field(&rejection)])
    }
}

/// Field named by a deserialization error, or the whole body.
fn rejection_field(rejection: &JsonRejection) -> FieldError {
    let text = rejection.body_text();
    if let JsonRejection::JsonDataError(_) = rejection {
        // "<prefix>: <path>: <serde message>"
        let field = text
            .split_once("target type: ")
            .and_then(|(_, detail)| detail.split_once(": "))
            .filter(|(path, _)| !path.is_empty() && !path.contains(char::is_whitespace));
        if let Some((path, msg)) = field {
            return FieldError::new(path, msg);
        }
    }
    FieldError::new("body", text)
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText<T> {
    Number(T),
    Text(String),
}

/// Optional number that may also arrive as a numeric string, as HTML forms
/// send it. Blank strings count as absent.
pub fn lenient_number<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
{
    match Option::<NumberOrText<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a number, got {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Validate)]
    struct Signup {
        #[validate(email(message = "Enter a Valid Email"))]
        email: String,
        #[validate(length(min = 3))]
        name: String,
    }

    #[test]
    fn valid_input_passes() {
        let signup = Signup {
            email: "ann@x.com".to_string(),
            name: "Ann".to_string(),
        };
        assert!(validated(signup).is_ok());
    }

    #[test]
    fn failures_are_sorted_and_defaulted() {
        let signup = Signup {
            email: "not-an-email".to_string(),
            name: "A".to_string(),
        };
        let errors = failures(&signup);

        assert_eq!(
            errors,
            vec![
                FieldError::new("email", "Enter a Valid Email"),
                FieldError::new("name", "Invalid value"),
            ]
        );
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Measurements {
        #[serde(deserialize_with = "lenient_number")]
        age: Option<u32>,
        #[serde(deserialize_with = "lenient_number")]
        height: Option<f64>,
    }

    #[test]
    fn lenient_number_accepts_numeric_strings() {
        let m: Measurements =
            serde_json::from_value(serde_json::json!({ "age": "30", "height": 165 })).unwrap();
        assert_eq!(m.age, Some(30));
        assert_eq!(m.height, Some(165.0));

        let m: Measurements =
            serde_json::from_value(serde_json::json!({ "age": "", "height": null })).unwrap();
        assert_eq!(m.age, None);
        assert_eq!(m.height, None);

        let m: Measurements = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(m.age, None);
    }

    #[test]
    fn lenient_number_rejects_non_numbers() {
        assert!(serde_json::from_value::<Measurements>(serde_json::json!({ "age": "thirty" })).is_err());
        assert!(serde_json::from_value::<Measurements>(serde_json::json!({ "age": true })).is_err());
    }

    #[test]
    fn empty_list_is_ok() {
        assert!(into_result(Vec::new()).is_ok());
        assert!(matches!(
            into_result(vec![FieldError::new("x", "bad")]),
            Err(AppError::Validation(_))
        ));
    }
}
