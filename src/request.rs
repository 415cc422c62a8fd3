//! Invocation payload parsing.
//!
//! The hosting platform delivers the event as opaque JSON. It is decoded into
//! a typed schema and validated here, so that everything downstream works
//! with a [`ConversionRequest`] whose URL is known to be fetchable in form and
//! whose DPI is already defaulted and range-checked.
//!
//! Accepted shapes:
//!
//! ```text
//! { "queryParameters": { "pdf_url": "https://…", "dpi": 150 } }
//! { "queryParameters": { "pdf_url": "https://…", "dpi": "150" } }
//! { "queryParameters": { "pdf_url": "https://…" }, "dpi": 150 }
//! "{\"queryParameters\": {…}}"                    (JSON-encoded string)
//! { "body": "{\"queryParameters\": {…}}" }        (HTTP trigger wrapper)
//! ```

use crate::config::{MAX_DPI, MIN_DPI};
use crate::error::Pdf2ZipError;
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

/// A validated conversion request.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    pub pdf_url: Url,
    pub dpi: u32,
}

#[derive(Debug, Default, Deserialize)]
struct InvocationPayload {
    #[serde(rename = "queryParameters", default)]
    query_parameters: Option<QueryParameters>,
    #[serde(default)]
    dpi: Option<DpiValue>,
}

#[derive(Debug, Default, Deserialize)]
struct QueryParameters {
    #[serde(default)]
    pdf_url: Option<String>,
    #[serde(default)]
    dpi: Option<DpiValue>,
}

/// HTTP triggers hand query parameters over as strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum DpiValue {
    Number(serde_json::Number),
    Text(String),
}

impl ConversionRequest {
    /// Decode and validate an invocation event.
    ///
    /// `default_dpi` applies when neither `queryParameters.dpi` nor a
    /// top-level `dpi` is present.
    pub fn from_event(event: Value, default_dpi: u32) -> Result<Self, Pdf2ZipError> {
        let event = unwrap_event(event)?;
        let payload: InvocationPayload = serde_json::from_value(event)
            .map_err(|e| Pdf2ZipError::MalformedEvent(e.to_string()))?;

        let params = payload.query_parameters.unwrap_or_default();
        let pdf_url = parse_pdf_url(params.pdf_url.as_deref())?;
        let dpi = match params.dpi.or(payload.dpi) {
            Some(value) => parse_dpi(value)?.unwrap_or(default_dpi),
            None => default_dpi,
        };

        Ok(Self { pdf_url, dpi })
    }
}

/// Peel the transport layers off an event: string-encoded JSON and an
/// HTTP-trigger `body` wrapper.
fn unwrap_event(event: Value) -> Result<Value, Pdf2ZipError> {
    let event = match event {
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| Pdf2ZipError::MalformedEvent(format!("event is not JSON: {e}")))?,
        other => other,
    };

    if !event.is_object() {
        return Err(Pdf2ZipError::MalformedEvent(
            "event must be a JSON object".to_string(),
        ));
    }
    if event.get("queryParameters").is_some() {
        return Ok(event);
    }

    let Some(body) = event.get("body").filter(|b| !b.is_null()).cloned() else {
        return Ok(event);
    };

    match body {
        Value::Object(_) => Ok(body),
        Value::String(text) if text.trim().is_empty() => Ok(Value::Object(Default::default())),
        Value::String(text) => serde_json::from_str(&text)
            .map_err(|e| Pdf2ZipError::MalformedEvent(format!("body is not JSON: {e}"))),
        _ => Err(Pdf2ZipError::MalformedEvent(
            "body must be a JSON object".to_string(),
        )),
    }
}

fn parse_pdf_url(raw: Option<&str>) -> Result<Url, Pdf2ZipError> {
    let raw = raw.map(str::trim).unwrap_or_default();
    if raw.is_empty() {
        return Err(Pdf2ZipError::MissingPdfUrl);
    }

    let invalid = |reason: String| Pdf2ZipError::InvalidPdfUrl {
        url: raw.to_string(),
        reason,
    };

    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

/// `Ok(None)` means "present but empty"; the caller falls back to the default.
fn parse_dpi(value: DpiValue) -> Result<Option<u32>, Pdf2ZipError> {
    let invalid = |value: String| Pdf2ZipError::InvalidDpi {
        value,
        min: MIN_DPI,
        max: MAX_DPI,
    };

    let dpi = match value {
        DpiValue::Number(n) => n
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
            .ok_or_else(|| invalid(n.to_string()))?,
        DpiValue::Text(text) => {
            let text = text.trim();
            if text.is_empty() {
                return Ok(None);
            }
            text.parse::<u32>().map_err(|_| invalid(text.to_string()))?
        }
    };

    if !(MIN_DPI..=MAX_DPI).contains(&dpi) {
        return Err(invalid(dpi.to_string()));
    }
    Ok(Some(dpi))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const URL: &str = "https://example.com/docs/report.pdf";

    #[test]
    fn parses_query_parameters_with_default_dpi() {
        let req =
            ConversionRequest::from_event(json!({"queryParameters": {"pdf_url": URL}}), 200)
                .unwrap();
        assert_eq!(req.pdf_url.as_str(), URL);
        assert_eq!(req.dpi, 200);
    }

    #[test]
    fn dpi_accepts_number_and_numeric_string() {
        let req = ConversionRequest::from_event(
            json!({"queryParameters": {"pdf_url": URL, "dpi": 150}}),
            200,
        )
        .unwrap();
        assert_eq!(req.dpi, 150);

        let req = ConversionRequest::from_event(
            json!({"queryParameters": {"pdf_url": URL, "dpi": " 300 "}}),
            200,
        )
        .unwrap();
        assert_eq!(req.dpi, 300);

        let req = ConversionRequest::from_event(
            json!({"queryParameters": {"pdf_url": URL, "dpi": ""}}),
            180,
        )
        .unwrap();
        assert_eq!(req.dpi, 180);
    }

    #[test]
    fn top_level_dpi_is_a_fallback() {
        let req = ConversionRequest::from_event(
            json!({"queryParameters": {"pdf_url": URL}, "dpi": 96}),
            200,
        )
        .unwrap();
        assert_eq!(req.dpi, 96);

        let req = ConversionRequest::from_event(
            json!({"queryParameters": {"pdf_url": URL, "dpi": 120}, "dpi": 96}),
            200,
        )
        .unwrap();
        assert_eq!(req.dpi, 120);
    }

    #[test]
    fn rejects_out_of_range_or_non_integer_dpi() {
        for dpi in [json!(0), json!(5000), json!(-10), json!(150.5), json!("high")] {
            let err = ConversionRequest::from_event(
                json!({"queryParameters": {"pdf_url": URL, "dpi": dpi}}),
                200,
            )
            .unwrap_err();
            assert!(matches!(err, Pdf2ZipError::InvalidDpi { .. }), "dpi {dpi}: {err}");
        }
    }

    #[test]
    fn missing_or_blank_url_is_rejected() {
        for event in [
            json!({}),
            json!({"queryParameters": {}}),
            json!({"queryParameters": null}),
            json!({"queryParameters": {"pdf_url": "   "}}),
            json!({"queryParameters": {"dpi": 100}}),
        ] {
            let err = ConversionRequest::from_event(event, 200).unwrap_err();
            assert!(matches!(err, Pdf2ZipError::MissingPdfUrl), "got {err}");
        }
    }

    #[test]
    fn non_http_url_is_rejected() {
        for url in ["ftp://example.com/a.pdf", "file:///etc/passwd", "not a url"] {
            let err = ConversionRequest::from_event(
                json!({"queryParameters": {"pdf_url": url}}),
                200,
            )
            .unwrap_err();
            assert!(matches!(err, Pdf2ZipError::InvalidPdfUrl { .. }), "{url}: {err}");
        }
    }

    #[test]
    fn unwraps_string_event_and_http_body() {
        let encoded = json!({"queryParameters": {"pdf_url": URL, "dpi": 72}}).to_string();
        let req = ConversionRequest::from_event(Value::String(encoded.clone()), 200).unwrap();
        assert_eq!(req.dpi, 72);

        let req = ConversionRequest::from_event(json!({ "body": encoded }), 200).unwrap();
        assert_eq!(req.dpi, 72);

        let req = ConversionRequest::from_event(
            json!({"body": {"queryParameters": {"pdf_url": URL}}}),
            200,
        )
        .unwrap();
        assert_eq!(req.pdf_url.as_str(), URL);
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let req = ConversionRequest::from_event(
            json!({"queryParameters": {"pdf_url": URL, "lang": "en"}, "headers": {"x": 1}}),
            200,
        )
        .unwrap();
        assert_eq!(req.dpi, 200);
    }

    #[test]
    fn non_object_events_are_malformed() {
        for event in [json!([1, 2]), json!(42), Value::String("not json".into())] {
            let err = ConversionRequest::from_event(event, 200).unwrap_err();
            assert!(matches!(err, Pdf2ZipError::MalformedEvent(_)), "got {err}");
        }
    }
}
