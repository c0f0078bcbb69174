use std::borrow::Cow;

use axum::{
    Json,
    extract::{FromRequest, FromRequestParts, Request},
};
use serde::{Deserialize, Deserializer, de::DeserializeOwned};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors, ValidationErrorsKind};

use crate::error::{AppError, AppResult};

/// Free-form related record embedded in a response (a group summary, a
/// leader, a task's member, ...).
pub type Related = Map<String, Value>;

pub const ALLOWED_PLATFORMS: [&str; 4] = ["facebook", "instagram", "twitter", "linkedin"];

/// JSON body extractor that rejects the request unless every constraint on
/// `T` holds. Runs before the handler, so no collaborator is called for an
/// invalid body.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(body) = Json::<Value>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::MalformedBody(rejection.body_text()))?;
        decode_validated(body).map(ValidatedJson)
    }
}

/// Decodes a request object and runs its rules. A value of the wrong shape
/// is reported under its own field, next to the rule violations of every
/// field that did decode.
///
/// `T` must decode from `{}`: each field is defaulted or optional.
pub fn decode_validated<T>(body: Value) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let Value::Object(mut fields) = body else {
        return Err(AppError::MalformedBody(
            "Request body must be a JSON object".to_string(),
        ));
    };

    let mut errors = ValidationErrors::new();
    if serde_json::from_value::<T>(Value::Object(fields.clone())).is_err() {
        let keys: Vec<String> = fields.keys().cloned().collect();
        for key in keys {
            let Some(raw) = fields.get(&key).cloned() else {
                continue;
            };
            let alone = Map::from_iter([(key.clone(), raw)]);
            if let Err(e) = serde_json::from_value::<T>(Value::Object(alone)) {
                let raw = fields.remove(&key).unwrap_or(Value::Null);
                errors
                    .errors_mut()
                    .insert(Cow::Owned(key), ValidationErrorsKind::Field(vec![undecodable(&e, &raw)]));
            }
        }
    }

    let value: T = serde_json::from_value(Value::Object(fields))
        .map_err(|e| AppError::MalformedBody(e.to_string()))?;
    let checked = value.validate();

    if errors.is_empty() {
        checked?;
        return Ok(value);
    }
    if let Err(rule_errors) = checked {
        for (field, kind) in rule_errors.into_errors() {
            // a field that failed to decode already has its error, and the
            // cross-field stage only counts on a fully decoded body
            if field == "__all__" || errors.errors().contains_key(&field) {
                continue;
            }
            errors.errors_mut().insert(field, kind);
        }
    }
    Err(AppError::Validation(errors))
}

fn undecodable(error: &serde_json::Error, raw: &Value) -> ValidationError {
    let mut e = ValidationError::new("invalid_value").with_message(Cow::Owned(error.to_string()));
    e.add_param(Cow::Borrowed("value"), raw);
    e
}

/// `Path` whose rejection renders as the uniform error body instead of
/// axum's plain-text 400.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(AppError))]
pub struct ValidatedPath<T>(pub T);

/// Coerces a collaborator record into the declared response schema.
pub fn shape<T: DeserializeOwned>(schema: &'static str, record: Value) -> AppResult<T> {
    serde_json::from_value(record).map_err(|source| AppError::Contract { schema, source })
}

pub fn shape_all<T: DeserializeOwned>(schema: &'static str, records: Vec<Value>) -> AppResult<Vec<T>> {
    records.into_iter().map(|r| shape(schema, r)).collect()
}

/// Flattens `ValidationErrors` into `{field: [{code, message, params}]}`.
pub fn validation_details(errors: &ValidationErrors) -> Value {
    let mut details = Map::new();
    for (field, field_errors) in errors.field_errors() {
        let entries = field_errors
            .iter()
            .map(|e| {
                serde_json::json!({
                    "code": e.code,
                    "message": e.message.as_deref().unwrap_or("invalid value"),
                    "params": e.params,
                })
            })
            .collect();
        details.insert(field.to_string(), Value::Array(entries));
    }
    Value::Object(details)
}

pub fn lowercase<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(|s| s.to_lowercase())
}

/// Treats an explicit `null` the same as an absent field.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

pub fn validate_email_shape(email: &str) -> Result<(), ValidationError> {
    if email.contains('@') && email.contains('.') {
        return Ok(());
    }
    let mut error =
        ValidationError::new("email").with_message(Cow::Borrowed("Invalid email format"));
    error.add_param(Cow::Borrowed("value"), &email);
    Err(error)
}

pub fn validate_platform(platform: &str) -> Result<(), ValidationError> {
    if ALLOWED_PLATFORMS.contains(&platform) {
        return Ok(());
    }
    let mut error = ValidationError::new("platform").with_message(Cow::Owned(format!(
        "Platform must be one of: {}",
        ALLOWED_PLATFORMS.join(", ")
    )));
    error.add_param(Cow::Borrowed("allowed"), &ALLOWED_PLATFORMS);
    error.add_param(Cow::Borrowed("value"), &platform);
    Err(error)
}

pub mod error_codes {
    pub const VALIDATION_ERROR: i32 = 1000;
    pub const NOT_FOUND: i32 = 1004;
    pub const COLLABORATOR_ERROR: i32 = 5001;
    pub const CONTRACT_VIOLATION: i32 = 5002;
    pub const INTERNAL_ERROR: i32 = 5000;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn email_needs_at_and_dot() {
        assert!(validate_email_shape("a@b.org").is_ok());
        assert!(validate_email_shape("bad").is_err());
        assert!(validate_email_shape("a@b").is_err());
        assert!(validate_email_shape("a.b").is_err());
    }

    #[test]
    fn platform_error_lists_allowed_set() {
        let err = validate_platform("myspace").unwrap_err();
        assert_eq!(err.code, "platform");
        assert_eq!(
            err.message.as_deref(),
            Some("Platform must be one of: facebook, instagram, twitter, linkedin")
        );
        assert_eq!(
            err.params["allowed"],
            json!(["facebook", "instagram", "twitter", "linkedin"])
        );
    }

    #[test]
    fn details_group_errors_by_field() {
        let mut errors = ValidationErrors::new();
        errors.add("title", ValidationError::new("length"));
        errors.add("title", ValidationError::new("other"));
        errors.add("email", ValidationError::new("email"));

        let details = validation_details(&errors);
        assert_eq!(details["title"].as_array().unwrap().len(), 2);
        assert_eq!(details["email"][0]["code"], "email");
        assert_eq!(details["email"][0]["message"], "invalid value");
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(rename_all = "snake_case")]
    enum Plan {
        #[default]
        Basic,
        Premium,
    }

    #[derive(Debug, Deserialize, Validate)]
    struct Signup {
        #[serde(default)]
        #[validate(length(min = 1))]
        name: String,
        #[serde(default)]
        plan: Plan,
        #[validate(range(min = 1))]
        seats: Option<i64>,
    }

    fn field_codes(err: AppError) -> Vec<(String, String)> {
        let AppError::Validation(errors) = err else {
            panic!("expected validation errors, got {err:?}");
        };
        let mut codes: Vec<(String, String)> = errors
            .field_errors()
            .into_iter()
            .map(|(field, errs)| (field.to_string(), errs[0].code.to_string()))
            .collect();
        codes.sort();
        codes
    }

    #[test]
    fn undecodable_fields_are_reported_with_rule_errors() {
        let err = decode_validated::<Signup>(json!({
            "name": "",
            "plan": "gold",
            "seats": 0,
        }))
        .unwrap_err();

        assert_eq!(
            field_codes(err),
            vec![
                ("name".to_string(), "length".to_string()),
                ("plan".to_string(), "invalid_value".to_string()),
                ("seats".to_string(), "range".to_string()),
            ]
        );
    }

    #[test]
    fn unknown_variant_message_lists_allowed_values() {
        let err = decode_validated::<Signup>(json!({"name": "Ann", "plan": "gold"})).unwrap_err();
        let AppError::Validation(errors) = err else {
            panic!("expected validation errors");
        };
        let message = errors.field_errors()["plan"][0].message.clone().unwrap();
        assert!(message.contains("`basic`"), "{message}");
        assert!(message.contains("`premium`"), "{message}");
    }

    #[test]
    fn wrong_type_does_not_double_report() {
        // null is not a string; the length rule must not fire on top of it
        let err = decode_validated::<Signup>(json!({"name": null})).unwrap_err();
        assert_eq!(
            field_codes(err),
            vec![("name".to_string(), "invalid_value".to_string())]
        );
    }

    #[test]
    fn non_object_body_is_malformed() {
        let err = decode_validated::<Signup>(json!([1, 2])).unwrap_err();
        assert!(matches!(err, AppError::MalformedBody(_)));
    }

    #[test]
    fn valid_body_decodes() {
        let signup: Signup = decode_validated(json!({"name": "Ann", "plan": "premium"})).unwrap();
        assert!(matches!(signup.plan, Plan::Premium));
        assert_eq!(signup.name, "Ann");
    }

    #[derive(Debug, Deserialize)]
    struct Sample {
        #[serde(default)]
        id: i64,
    }

    #[test]
    fn shape_reports_contract_violation() {
        let ok: Sample = shape("Sample", json!({"id": 3})).unwrap();
        assert_eq!(ok.id, 3);

        let err = shape::<Sample>("Sample", json!({"id": "three"})).unwrap_err();
        assert!(matches!(err, AppError::Contract { schema: "Sample", .. }));
    }
}
