//! OCS request construction and envelope handling.
//!
//! OCS endpoints wrap their payload in
//! `{"ocs": {"meta": {"status", "statuscode", "message"}, "data": ...}}`.

use serde::Deserialize;
use serde_json::Value;

use nextcloud_core::NextcloudError;

use crate::transport::{ApiRequest, ApiResponse, Method};

/// Header every OCS request must carry.
pub const OCS_API_HEADER: &str = "OCS-APIRequest";

#[derive(Debug, Deserialize)]
struct Envelope {
    ocs: OcsBody,
}

#[derive(Debug, Deserialize)]
struct OcsBody {
    meta: OcsMeta,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Deserialize)]
struct OcsMeta {
    status: String,
    #[serde(default)]
    statuscode: u16,
    #[serde(default)]
    message: Option<String>,
}

/// Builds an OCS request.
///
/// `params` must be a JSON object or null. For GET they go into the query
/// string; otherwise they form the JSON body. `format=json` is always added.
pub fn ocs_request(method: Method, url: impl Into<String>, params: Value) -> ApiRequest {
    let mut request = ApiRequest::new(method.clone(), url)
        .header(OCS_API_HEADER, "true")
        .header("Accept", "application/json");

    let mut params = match params {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    };

    if method == Method::GET {
        request = request.query("format", "json");
        for (key, value) in params {
            request = append_query(request, &key, &value);
        }
        request
    } else {
        params.insert("format".to_string(), Value::from("json"));
        request.json(Value::Object(params))
    }
}

fn append_query(request: ApiRequest, key: &str, value: &Value) -> ApiRequest {
    match value {
        Value::Null => request,
        Value::String(s) => request.query(key, s.as_str()),
        Value::Array(items) => items
            .iter()
            .fold(request, |req, item| append_query(req, &format!("{key}[]"), item)),
        other => request.query(key, other.to_string()),
    }
}

/// Fails with the mapped [`NextcloudError`] if the HTTP status is not 2xx.
///
/// # Errors
///
/// Returns the error matching the response status.
pub fn check_status(response: &ApiResponse) -> Result<(), NextcloudError> {
    if response.is_success() {
        Ok(())
    } else {
        Err(NextcloudError::from_status(
            response.status,
            error_reason(response),
        ))
    }
}

/// Best human-readable reason for a failed response: the OCS message if the
/// body is an envelope, otherwise a body excerpt.
pub fn error_reason(response: &ApiResponse) -> String {
    serde_json::from_slice::<Envelope>(&response.body)
        .ok()
        .and_then(|env| env.ocs.meta.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| response.reason_excerpt())
}

/// Checks the HTTP status and the envelope, returning `ocs.data`.
///
/// # Errors
///
/// - Status errors from [`check_status`]
/// - [`NextcloudError::InvalidResponse`] for an empty or undecodable body
/// - [`NextcloudError::Ocs`] when `meta.status` is not `"ok"`
pub fn parse_envelope(response: &ApiResponse) -> Result<Value, NextcloudError> {
    check_status(response)?;

    if response.body.is_empty() {
        return Err(NextcloudError::InvalidResponse(
            "Invalid response from server.".to_string(),
        ));
    }

    let envelope: Envelope = serde_json::from_slice(&response.body)
        .map_err(|e| NextcloudError::InvalidResponse(format!("Error decoding OCS response: {e}")))?;

    let OcsBody { meta, data } = envelope.ocs;
    if meta.status != "ok" {
        return Err(NextcloudError::Ocs {
            statuscode: meta.statuscode,
            message: meta.message.unwrap_or_default(),
        });
    }

    Ok(data)
}
