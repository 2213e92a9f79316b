//! # Request Validators
//!
//! Each validator inspects a request plus the resource configuration and
//! either passes or returns the [`StatusError`] to answer with. The pipeline
//! is:
//!
//! 1. [`accept`], always.
//! 2. [`content_type`] and [`data_object`], only when the body has `data`.
//! 3. The resource's own validators, in declaration order.
//!
//! The first failure stops the pipeline.
//!
//! [`type_matches`], [`id_matches_path`] and [`known_attributes`] are not part
//! of the fixed pipeline; resources opt in through
//! [`ResourceConfig::with_validator`](crate::ResourceConfig::with_validator).

use crate::config::ResourceConfig;
use crate::error::StatusError;
use crate::request::{ApiRequest, JSONAPI_MEDIA_TYPE};
use http::header::{ACCEPT, CONTENT_TYPE};
use serde_json::Value;

/// A single validation step.
pub type Validator = fn(&ApiRequest, &ResourceConfig) -> Result<(), StatusError>;

/// Runs the full pipeline for `request`.
pub fn run(request: &ApiRequest, config: &ResourceConfig) -> Result<(), StatusError> {
    let mut pipeline: Vec<Validator> = vec![accept];
    if request.data().is_some() {
        pipeline.push(content_type);
        pipeline.push(data_object);
    }
    pipeline.extend(config.validators.iter().copied());
    run_all(&pipeline, request, config)
}

/// Runs `validators` in order and stops at the first error.
pub fn run_all(
    validators: &[Validator],
    request: &ApiRequest,
    config: &ResourceConfig,
) -> Result<(), StatusError> {
    validators
        .iter()
        .try_for_each(|validate| validate(request, config))
}

/// Splits a media range into its essence and whether it carries parameters.
fn media_range(raw: &str) -> (String, bool) {
    let mut parts = raw.split(';');
    let essence = parts.next().unwrap_or_default().trim().to_ascii_lowercase();
    // `q` weights belong to the Accept syntax, not to the media type.
    let has_params = parts.any(|p| {
        let name = p.split('=').next().unwrap_or_default().trim();
        !name.is_empty() && !name.eq_ignore_ascii_case("q")
    });
    (essence, has_params)
}

/// Answers 406 when the client cannot take the JSON:API media type.
///
/// A missing Accept header accepts everything. Otherwise at least one entry
/// must be an unparameterized JSON:API media type or a wildcard, and
/// JSON:API entries that all carry parameters are refused.
pub fn accept(request: &ApiRequest, _config: &ResourceConfig) -> Result<(), StatusError> {
    let ranges: Vec<(String, bool)> = request
        .headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter(|range| !range.trim().is_empty())
        .map(media_range)
        .collect();

    if ranges.is_empty() {
        return Ok(());
    }

    let jsonapi: Vec<bool> = ranges
        .iter()
        .filter(|(essence, _)| essence == JSONAPI_MEDIA_TYPE)
        .map(|(_, has_params)| *has_params)
        .collect();

    if !jsonapi.is_empty() && jsonapi.iter().all(|has_params| *has_params) {
        return Err(StatusError::not_acceptable(format!(
            "Accept header must include {} without media type parameters",
            JSONAPI_MEDIA_TYPE
        )));
    }

    let acceptable = ranges.iter().any(|(essence, _)| {
        essence == JSONAPI_MEDIA_TYPE || essence == "*/*" || essence == "application/*"
    });
    if !acceptable {
        return Err(StatusError::not_acceptable(format!(
            "Accept header must allow {}",
            JSONAPI_MEDIA_TYPE
        )));
    }
    Ok(())
}

/// Answers 415 unless the body is declared as exactly the JSON:API media type.
pub fn content_type(request: &ApiRequest, _config: &ResourceConfig) -> Result<(), StatusError> {
    let declared = request
        .headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(media_range);

    match declared {
        Some((essence, false)) if essence == JSONAPI_MEDIA_TYPE => Ok(()),
        Some((essence, true)) if essence == JSONAPI_MEDIA_TYPE => {
            Err(StatusError::unsupported_media_type(format!(
                "Content-Type {} must not carry media type parameters",
                JSONAPI_MEDIA_TYPE
            )))
        }
        Some((essence, _)) => Err(StatusError::unsupported_media_type(format!(
            "Content-Type must be {}, got {}",
            JSONAPI_MEDIA_TYPE, essence
        ))),
        None => Err(StatusError::unsupported_media_type(format!(
            "Content-Type must be {}",
            JSONAPI_MEDIA_TYPE
        ))),
    }
}

fn is_identifier(value: &Value) -> bool {
    value.get("type").is_some_and(Value::is_string) && value.get("id").is_some_and(is_id)
}

fn is_id(value: &Value) -> bool {
    value.is_string() || value.is_number()
}

/// Answers 400 when `data` is not shaped like a resource object.
///
/// Relationship routes also accept `null`, a resource identifier, or an array
/// of resource identifiers.
pub fn data_object(request: &ApiRequest, _config: &ResourceConfig) -> Result<(), StatusError> {
    let Some(data) = request.data() else {
        return Ok(());
    };

    if request.params.relation.is_some() {
        let linkage_ok = match data {
            Value::Null => true,
            Value::Array(items) => items.iter().all(is_identifier),
            other => is_identifier(other),
        };
        return if linkage_ok {
            Ok(())
        } else {
            Err(StatusError::bad_request(
                "Relationship data must be null, a resource identifier, or an array of them",
            ))
        };
    }

    let Some(object) = data.as_object() else {
        return Err(StatusError::bad_request("Primary data must be a single resource object"));
    };
    if !object.get("type").is_some_and(Value::is_string) {
        return Err(StatusError::bad_request("Resource object must have a string `type`"));
    }
    if object.get("id").is_some_and(|id| !is_id(id)) {
        return Err(StatusError::bad_request("Resource object `id` must be a string or a number"));
    }
    if object.get("attributes").is_some_and(|a| !a.is_object()) {
        return Err(StatusError::bad_request("Resource object `attributes` must be an object"));
    }
    Ok(())
}

/// Answers 409 when the body's `type` is not this resource's type.
pub fn type_matches(request: &ApiRequest, config: &ResourceConfig) -> Result<(), StatusError> {
    if request.params.relation.is_some() {
        return Ok(());
    }
    match request.data().and_then(|d| d.get("type")).and_then(Value::as_str) {
        Some(found) if found != config.type_name => Err(StatusError::conflict(format!(
            "Resource type {} does not match endpoint type {}",
            found, config.type_name
        ))),
        _ => Ok(()),
    }
}

/// Answers 409 when the body's `id` disagrees with the `id` path parameter.
pub fn id_matches_path(request: &ApiRequest, _config: &ResourceConfig) -> Result<(), StatusError> {
    if request.params.relation.is_some() {
        return Ok(());
    }
    let (Some(path_id), Some(body_id)) = (
        request.params.id.as_deref(),
        request.data().and_then(|d| d.get("id")).and_then(id_text),
    ) else {
        return Ok(());
    };
    if path_id != body_id {
        return Err(StatusError::conflict(format!(
            "Resource id {} does not match endpoint id {}",
            body_id, path_id
        )));
    }
    Ok(())
}

/// Answers 400 for attributes the resource does not declare.
pub fn known_attributes(request: &ApiRequest, config: &ResourceConfig) -> Result<(), StatusError> {
    let Some(attributes) = request
        .data()
        .and_then(|d| d.get("attributes"))
        .and_then(Value::as_object)
    else {
        return Ok(());
    };
    match attributes.keys().find(|name| !config.has_attribute(name)) {
        Some(unknown) => Err(StatusError::bad_request(format!(
            "{} has no attribute named {}",
            config.type_name, unknown
        ))),
        None => Ok(()),
    }
}

/// Renders a JSON id (string or number) as text.
pub(crate) fn id_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
