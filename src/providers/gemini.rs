use crate::{
    auth::Credential,
    config::GeminiConfig,
    errors::{Result, SlopError, Stage},
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use reqwest::{Client as HttpClient, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

/// Finish reasons meaning the model withheld its output on policy grounds.
const POLICY_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "PROHIBITED_CONTENT",
    "BLOCKLIST",
    "SPII",
    "IMAGE_SAFETY",
];

const SAFETY_SETTINGS: &[SafetySetting] = &[
    SafetySetting::block_only_high("HARM_CATEGORY_HARASSMENT"),
    SafetySetting::block_only_high("HARM_CATEGORY_HATE_SPEECH"),
    SafetySetting::block_only_high("HARM_CATEGORY_SEXUALLY_EXPLICIT"),
    SafetySetting::block_only_high("HARM_CATEGORY_DANGEROUS_CONTENT"),
];

const MAX_ERROR_BODY_CHARS: usize = 300;

/// Thin client for the Generative Language REST endpoints.
///
/// Each call makes exactly one request with the transport's default timeout;
/// retrying is left to whoever invoked the pipeline.
#[derive(Clone)]
pub struct GeminiClient {
    http_client: HttpClient,
    api_url: String,
}

impl GeminiClient {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("slopify/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http_client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    /// `:generateContent` call returning the top candidate's text.
    pub async fn generate_content(
        &self,
        stage: Stage,
        model: &str,
        parts: Vec<Part<'_>>,
        temperature: f32,
        credential: &Credential,
    ) -> Result<String> {
        let payload = GenerateContentRequest {
            contents: vec![Content { parts }],
            generation_config: GenerationConfig { temperature },
            safety_settings: SAFETY_SETTINGS,
        };

        let response: GenerateContentResponse = self
            .post(stage, model, "generateContent", &payload, credential)
            .await?;
        response.into_text(stage)
    }

    /// `:predict` call on an Imagen model returning raw image bytes.
    pub async fn predict_image(
        &self,
        stage: Stage,
        model: &str,
        prompt: &str,
        credential: &Credential,
    ) -> Result<GeneratedImage> {
        let payload = PredictRequest {
            instances: vec![PredictInstance { prompt }],
            parameters: PredictParameters {
                aspect_ratio: "1:1",
                sample_count: 1,
                person_generation: "allow_adult",
            },
        };

        let response: PredictResponse = self
            .post(stage, model, "predict", &payload, credential)
            .await?;
        response.into_image(stage)
    }

    async fn post<B, T>(
        &self,
        stage: Stage,
        model: &str,
        method: &str,
        payload: &B,
        credential: &Credential,
    ) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let endpoint = format!("{}/{}:{}", self.api_url, model, method);

        let response = self
            .http_client
            .post(&endpoint)
            .query(&[("key", credential.expose())])
            .json(payload)
            .send()
            .await
            .map_err(|err| SlopError::Transport(err.without_url()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|err| SlopError::Transport(err.without_url()))?;

        debug!(target: "gemini", %stage, model, %status, body_len = body.len(), "response received");
        decode_body(stage, status, &body)
    }
}

/// Turns a raw HTTP response into `T`, translating error envelopes.
fn decode_body<T: DeserializeOwned>(stage: Stage, status: StatusCode, body: &str) -> Result<T> {
    if !status.is_success() {
        let message = serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|parsed| parsed.error)
            .map(|envelope| envelope.describe())
            .unwrap_or_else(|| format!("HTTP {}: {}", status, truncate(body.trim())));
        warn!(target: "gemini", %stage, %status, "service returned an error");
        return Err(SlopError::upstream(stage, message));
    }

    serde_json::from_str(body).map_err(|err| SlopError::MalformedResponse {
        stage,
        detail: err.to_string(),
    })
}

fn truncate(body: &str) -> String {
    if body.chars().count() <= MAX_ERROR_BODY_CHARS {
        body.to_string()
    } else {
        let head: String = body.chars().take(MAX_ERROR_BODY_CHARS).collect();
        format!("{head}…")
    }
}

pub fn mime_type_for(extension: Option<&str>) -> &'static str {
    match extension.map(|ext| ext.to_ascii_lowercase()).as_deref() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "image/jpeg",
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
    safety_settings: &'static [SafetySetting],
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
#[serde(untagged)]
pub enum Part<'a> {
    Text { text: &'a str },
    InlineData { inline_data: InlineData },
}

impl<'a> Part<'a> {
    pub fn text(text: &'a str) -> Self {
        Part::Text { text }
    }

    pub fn image(mime_type: &str, bytes: &[u8]) -> Self {
        Part::InlineData {
            inline_data: InlineData {
                mime_type: mime_type.to_string(),
                data: BASE64_STANDARD.encode(bytes),
            },
        }
    }
}

#[derive(Serialize)]
pub struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Serialize)]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

impl SafetySetting {
    const fn block_only_high(category: &'static str) -> Self {
        Self {
            category,
            threshold: "BLOCK_ONLY_HIGH",
        }
    }
}

#[derive(Serialize)]
struct PredictRequest<'a> {
    instances: Vec<PredictInstance<'a>>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance<'a> {
    prompt: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PredictParameters {
    aspect_ratio: &'static str,
    sample_count: u32,
    person_generation: &'static str,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<ErrorEnvelope>,
}

#[derive(Deserialize, Debug)]
struct ErrorEnvelope {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<i64>,
}

impl ErrorEnvelope {
    fn describe(self) -> String {
        match (self.message, self.status, self.code) {
            (Some(message), _, _) if !message.trim().is_empty() => message,
            (_, Some(status), _) => status,
            (_, None, Some(code)) => format!("error code {code}"),
            _ => "unknown error".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
    #[serde(default)]
    error: Option<ErrorEnvelope>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize, Debug)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    pub fn into_text(self, stage: Stage) -> Result<String> {
        if let Some(envelope) = self.error {
            return Err(SlopError::upstream(stage, envelope.describe()));
        }

        if let Some(reason) = self.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(SlopError::content_policy(stage, reason));
        }

        let Some(top) = self.candidates.into_iter().next() else {
            return Err(SlopError::EmptyResponse {
                stage,
                expected: "candidates",
            });
        };

        let text = top
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return Ok(text.trim().to_string());
        }

        match top.finish_reason {
            Some(reason) if POLICY_FINISH_REASONS.contains(&reason.as_str()) => {
                Err(SlopError::content_policy(stage, reason))
            }
            _ => Err(SlopError::EmptyResponse {
                stage,
                expected: "text",
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub data: Vec<u8>,
    pub mime_type: String,
}

#[derive(Deserialize, Debug, Default)]
pub struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
    #[serde(default)]
    error: Option<ErrorEnvelope>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct Prediction {
    #[serde(default)]
    bytes_base64_encoded: Option<String>,
    #[serde(default)]
    mime_type: Option<String>,
    #[serde(default)]
    rai_filtered_reason: Option<String>,
}

impl PredictResponse {
    pub fn into_image(self, stage: Stage) -> Result<GeneratedImage> {
        if let Some(envelope) = self.error {
            return Err(SlopError::upstream(stage, envelope.describe()));
        }

        let mut filtered_reason = None;
        for prediction in self.predictions {
            match prediction.bytes_base64_encoded {
                Some(encoded) if !encoded.is_empty() => {
                    let data = BASE64_STANDARD.decode(encoded.trim()).map_err(|err| {
                        SlopError::MalformedResponse {
                            stage,
                            detail: format!("image payload is not valid base64: {err}"),
                        }
                    })?;
                    return Ok(GeneratedImage {
                        data,
                        mime_type: prediction
                            .mime_type
                            .unwrap_or_else(|| "image/png".to_string()),
                    });
                }
                _ => {
                    if filtered_reason.is_none() {
                        filtered_reason = prediction.rai_filtered_reason;
                    }
                }
            }
        }

        match filtered_reason {
            Some(reason) => Err(SlopError::content_policy(stage, reason)),
            None => Err(SlopError::EmptyResponse {
                stage,
                expected: "image",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;

    fn content(json: &str) -> Result<String> {
        serde_json::from_str::<GenerateContentResponse>(json)
            .unwrap()
            .into_text(Stage::Vision)
    }

    fn predict(json: &str) -> Result<GeneratedImage> {
        serde_json::from_str::<PredictResponse>(json)
            .unwrap()
            .into_image(Stage::Imagen)
    }

    #[test]
    fn text_of_top_candidate() {
        let text = content(
            r#"{"candidates":[{"content":{"parts":[{"text":"A glossy "},{"text":"shrimp cathedral"}]},"finishReason":"STOP"},
                {"content":{"parts":[{"text":"ignored"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(text, "A glossy shrimp cathedral");
    }

    #[test]
    fn safety_finish_reason_is_content_policy() {
        let err = content(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentPolicy);
    }

    #[test]
    fn blocked_prompt_is_content_policy() {
        let err = content(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentPolicy);
        assert!(err.to_string().contains("OTHER"));
    }

    #[test]
    fn missing_text_without_reason_is_empty() {
        for body in [
            r#"{}"#,
            r#"{"candidates":[]}"#,
            r#"{"candidates":[{"content":{"parts":[{"text":"  "}]},"finishReason":"STOP"}]}"#,
            r#"{"candidates":[{"content":{"parts":[]}}]}"#,
            r#"{"candidates":[{"finishReason":"RECITATION"}]}"#,
        ] {
            let err = content(body).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::EmptyResponse, "{body}");
        }
    }

    #[test]
    fn error_envelope_passes_message_through() {
        let err = content(r#"{"error":{"code":400,"message":"API key not valid.","status":"INVALID_ARGUMENT"}}"#)
            .unwrap_err();
        assert_eq!(err.upstream_message(), Some("API key not valid."));
    }

    #[test]
    fn prediction_bytes_are_decoded() {
        let encoded = BASE64_STANDARD.encode([0x89, b'P', b'N', b'G', 0, 1, 2]);
        let image = predict(&format!(
            r#"{{"predictions":[{{"bytesBase64Encoded":"{encoded}","mimeType":"image/png"}}]}}"#
        ))
        .unwrap();
        assert_eq!(image.data, vec![0x89, b'P', b'N', b'G', 0, 1, 2]);
        assert_eq!(image.mime_type, "image/png");
    }

    #[test]
    fn missing_prediction_is_empty() {
        assert_eq!(predict("{}").unwrap_err().kind(), ErrorKind::EmptyResponse);
        assert_eq!(
            predict(r#"{"predictions":[{}]}"#).unwrap_err().kind(),
            ErrorKind::EmptyResponse
        );
    }

    #[test]
    fn filtered_prediction_is_content_policy() {
        let err = predict(r#"{"predictions":[{"raiFilteredReason":"people"}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ContentPolicy);
    }

    #[test]
    fn bad_base64_is_malformed() {
        let err = predict(r#"{"predictions":[{"bytesBase64Encoded":"***"}]}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedResponse);
    }

    #[test]
    fn http_failure_without_envelope_keeps_status() {
        let err = decode_body::<PredictResponse>(
            Stage::Imagen,
            StatusCode::SERVICE_UNAVAILABLE,
            "upstream connect error",
        )
        .unwrap_err();
        let message = err.upstream_message().unwrap();
        assert!(message.contains("503"));
        assert!(message.contains("upstream connect error"));
    }

    #[test]
    fn http_failure_with_envelope_uses_message() {
        let err = decode_body::<PredictResponse>(
            Stage::Imagen,
            StatusCode::TOO_MANY_REQUESTS,
            r#"{"error":{"code":429,"message":"quota exceeded","status":"RESOURCE_EXHAUSTED"}}"#,
        )
        .unwrap_err();
        assert_eq!(err.upstream_message(), Some("quota exceeded"));
    }

    #[test]
    fn request_payload_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part::text("describe"), Part::image("image/jpeg", &[1, 2, 3])],
            }],
            generation_config: GenerationConfig { temperature: 0.9 },
            safety_settings: SAFETY_SETTINGS,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "describe");
        assert_eq!(value["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(value["contents"][0]["parts"][1]["inline_data"]["data"], "AQID");
        assert_eq!(value["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(value["safetySettings"][0]["threshold"], "BLOCK_ONLY_HIGH");
        assert!(value["generationConfig"]["temperature"].as_f64().unwrap() > 0.89);
    }

    #[test]
    fn mime_type_from_extension() {
        assert_eq!(mime_type_for(Some("PNG")), "image/png");
        assert_eq!(mime_type_for(Some("jpeg")), "image/jpeg");
        assert_eq!(mime_type_for(None), "image/jpeg");
    }
}
