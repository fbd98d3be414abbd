//! Google Cloud Vision image annotation.
//!
//! Endpoint: POST /v1/images:annotate?key={api_key}
//! Requests label, text, logo and object-localization features in one call.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use super::{http_client, ImageAnnotations, ImageLabeler, ProviderError};

pub const DEFAULT_ENDPOINT: &str = "https://vision.googleapis.com/v1/images:annotate";

const MAX_LABELS: u32 = 10;
const MAX_LOGOS: u32 = 5;
const MAX_OBJECTS: u32 = 10;

/// Cloud Vision client
pub struct CloudVisionClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AnnotateResponse {
    #[serde(default)]
    responses: Vec<AnnotateResult>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnnotateResult {
    #[serde(default)]
    label_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    logo_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    text_annotations: Vec<EntityAnnotation>,
    #[serde(default)]
    localized_object_annotations: Vec<LocalizedObject>,
    error: Option<ApiStatus>,
}

#[derive(Debug, Deserialize)]
struct EntityAnnotation {
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct LocalizedObject {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct ApiStatus {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

impl CloudVisionClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            client: http_client(timeout)?,
        })
    }

    fn request_body(image: &[u8]) -> serde_json::Value {
        serde_json::json!({
            "requests": [{
                "image": { "content": BASE64.encode(image) },
                "features": [
                    { "type": "LABEL_DETECTION", "maxResults": MAX_LABELS },
                    { "type": "TEXT_DETECTION" },
                    { "type": "LOGO_DETECTION", "maxResults": MAX_LOGOS },
                    { "type": "OBJECT_LOCALIZATION", "maxResults": MAX_OBJECTS },
                ],
            }],
        })
    }
}

/// Flatten the first annotate result; provider-reported errors become `Err`
pub(crate) fn map_response(
    response: AnnotateResponse,
) -> Result<Option<ImageAnnotations>, ProviderError> {
    let Some(result) = response.responses.into_iter().next() else {
        return Ok(None);
    };

    if let Some(error) = result.error {
        let code = u16::try_from(error.code).unwrap_or(500);
        return Err(ProviderError::Status(code, error.message));
    }

    let descriptions = |annotations: Vec<EntityAnnotation>| -> Vec<String> {
        annotations
            .into_iter()
            .map(|a| a.description)
            .filter(|d| !d.trim().is_empty())
            .collect()
    };

    // The first text annotation holds the whole detected text block
    let text = result
        .text_annotations
        .first()
        .map(|t| t.description.clone())
        .unwrap_or_default();

    Ok(Some(ImageAnnotations {
        labels: descriptions(result.label_annotations),
        logos: descriptions(result.logo_annotations),
        objects: result
            .localized_object_annotations
            .into_iter()
            .map(|o| o.name)
            .filter(|n| !n.trim().is_empty())
            .collect(),
        text,
    }))
}

#[async_trait]
impl ImageLabeler for CloudVisionClient {
    fn name(&self) -> &str {
        "cloud_vision"
    }

    async fn annotate(&self, image: &[u8]) -> Result<Option<ImageAnnotations>, ProviderError> {
        debug!(bytes = image.len(), "Calling Cloud Vision");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&Self::request_body(image))
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::Status(status.as_u16(), body));
        }

        let decoded: AnnotateResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        map_response(decoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_features() {
        let body = CloudVisionClient::request_body(b"abc");
        let request = &body["requests"][0];
        assert_eq!(request["image"]["content"], "YWJj");

        let features: Vec<&str> = request["features"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["type"].as_str().unwrap())
            .collect();
        assert_eq!(
            features,
            vec!["LABEL_DETECTION", "TEXT_DETECTION", "LOGO_DETECTION", "OBJECT_LOCALIZATION"]
        );
    }

    #[test]
    fn test_map_full_response() {
        let response: AnnotateResponse = serde_json::from_str(
            r#"{
                "responses": [{
                    "labelAnnotations": [
                        { "description": "Bottle", "score": 0.97 },
                        { "description": "Soft drink", "score": 0.91 }
                    ],
                    "logoAnnotations": [{ "description": "Pepsi" }],
                    "localizedObjectAnnotations": [{ "name": "Bottle", "score": 0.88 }],
                    "textAnnotations": [
                        { "description": "PEPSI\n20 FL OZ" },
                        { "description": "PEPSI" }
                    ]
                }]
            }"#,
        )
        .unwrap();

        let annotations = map_response(response).unwrap().unwrap();
        assert_eq!(annotations.labels, vec!["Bottle", "Soft drink"]);
        assert_eq!(annotations.logos, vec!["Pepsi"]);
        assert_eq!(annotations.objects, vec!["Bottle"]);
        assert_eq!(annotations.text, "PEPSI\n20 FL OZ");
    }

    #[test]
    fn test_empty_responses_is_none() {
        let response: AnnotateResponse = serde_json::from_str(r#"{ "responses": [] }"#).unwrap();
        assert_eq!(map_response(response).unwrap(), None);
    }

    #[test]
    fn test_embedded_error_is_err() {
        let response: AnnotateResponse = serde_json::from_str(
            r#"{ "responses": [{ "error": { "code": 403, "message": "API key invalid" } }] }"#,
        )
        .unwrap();
        assert!(matches!(map_response(response), Err(ProviderError::Status(403, _))));
    }
}
