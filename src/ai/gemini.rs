use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::{AnalysisError, AuraReading, VisionProvider};
use crate::frame::{Frame, FRAME_MIME};
use crate::settings::Settings;

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiVisionClient {
    api_key: String,
    model: String,
    /// System-level persona instruction sent with every request.
    persona: String,
    /// The fixed analysis instruction that accompanies the photo.
    instruction: String,
    /// Sampling temperature; the product runs hot for creative variance.
    temperature: f32,
    client: Client,
}

impl GeminiVisionClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        persona: impl Into<String>,
        instruction: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            persona: persona.into(),
            instruction: instruction.into(),
            temperature: 1.1,
            client: Client::new(),
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            settings.api_key.clone(),
            settings.model.clone(),
            settings.persona.clone(),
            settings.instruction.clone(),
        )
        .with_temperature(settings.temperature)
    }

    fn endpoint_url(&self) -> String {
        format!("{}/models/{}:generateContent", BASE_URL, self.model)
    }

    fn build_request_body(&self, frame: &Frame) -> Value {
        json!({
            "contents": [
                {
                    "role": "user",
                    "parts": [
                        {
                            "inlineData": {
                                "mimeType": FRAME_MIME,
                                "data": frame.as_base64(),
                            }
                        },
                        { "text": self.instruction }
                    ]
                }
            ],
            "systemInstruction": {
                "parts": [{ "text": self.persona }]
            },
            "generationConfig": {
                "temperature": self.temperature,
                "responseMimeType": "application/json",
                "responseSchema": response_schema(),
            }
        })
    }
}

/// The structured-output schema the model is constrained to. Six fields,
/// all required; descriptions steer the tone of each one.
fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "vibeTitle": {
                "type": "STRING",
                "description": "사용자의 분위기를 나타내는 3-5단어의 짧고 트렌디한 한글 제목 (예: '나른한 오후의 햇살', '도심 속 힙스터', '청량한 여름 바람').",
            },
            "auraColorHex": {
                "type": "STRING",
                "description": "분위기를 대표하는 헥스 컬러 코드 (예: #FF00FF).",
            },
            "description": {
                "type": "STRING",
                "description": "사용자의 외모, 표정, 분위기를 토대로 한 재치있고 긍정적인 한글 평가. MBTI나 퍼스널 컬러 용어를 섞어서 20대가 좋아할 만한 톤앤매너로 작성.",
            },
            "energyLevel": {
                "type": "INTEGER",
                "description": "1에서 100 사이의 에너지 레벨 정수.",
            },
            "hashtags": {
                "type": "ARRAY",
                "items": { "type": "STRING" },
                "description": "분위기에 어울리는 트렌디한 한글 해시태그 3개 (예: #감성충만).",
            },
            "spiritEmoji": {
                "type": "STRING",
                "description": "분위기를 가장 잘 나타내는 이모지 1개.",
            },
        },
        "required": ["vibeTitle", "auraColorHex", "description", "energyLevel", "hashtags", "spiritEmoji"],
    })
}

/// Pull the model's text out of a `generateContent` response envelope.
/// A candidate may split its output across several parts; they concatenate.
fn extract_text(body: &Value) -> Result<String, AnalysisError> {
    let parts = body
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array());

    let text: String = match parts {
        Some(parts) => parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect(),
        None => String::new(),
    };

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyResponse);
    }
    Ok(text)
}

/// Parse and validate the model's JSON text into a reading.
fn parse_reading(text: &str) -> Result<AuraReading, AnalysisError> {
    let reading: AuraReading = serde_json::from_str(text)
        .map_err(|e| AnalysisError::Validation(format!("schema mismatch: {}", e)))?;
    reading.validate().map_err(AnalysisError::Validation)?;
    Ok(reading)
}

#[async_trait]
impl VisionProvider for GeminiVisionClient {
    async fn analyze(&self, frame: &Frame) -> Result<AuraReading, AnalysisError> {
        let url = self.endpoint_url();
        let body = self.build_request_body(frame);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AnalysisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".into());
            return Err(AnalysisError::Transport(format!(
                "HTTP {}: {}",
                status, error_body
            )));
        }

        let envelope: Value = response
            .json()
            .await
            .map_err(|e| AnalysisError::Validation(format!("invalid response envelope: {}", e)))?;

        let text = extract_text(&envelope)?;
        log::debug!("Gemini returned {} chars of reading JSON", text.len());
        parse_reading(&text)
    }

    fn name(&self) -> &str {
        "gemini-vision"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GeminiVisionClient {
        GeminiVisionClient::new("test-key", "gemini-2.5-flash", "persona text", "analyze this")
    }

    #[test]
    fn request_body_structure() {
        let body = client().build_request_body(&Frame::from_base64("base64data"));

        let parts = body["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[0]["inlineData"]["data"], "base64data");
        assert_eq!(parts[1]["text"], "analyze this");

        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["systemInstruction"]["parts"][0]["text"], "persona text");

        let config = &body["generationConfig"];
        assert_eq!(config["responseMimeType"], "application/json");
        assert!((config["temperature"].as_f64().unwrap() - 1.1).abs() < 1e-6);
    }

    #[test]
    fn request_body_temperature_override() {
        let body = client()
            .with_temperature(0.3)
            .build_request_body(&Frame::from_base64("x"));
        assert!((body["generationConfig"]["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    }

    #[test]
    fn schema_requires_all_six_fields() {
        let schema = response_schema();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(
            required,
            vec![
                "vibeTitle",
                "auraColorHex",
                "description",
                "energyLevel",
                "hashtags",
                "spiritEmoji"
            ]
        );
        assert_eq!(schema["properties"]["energyLevel"]["type"], "INTEGER");
        assert_eq!(schema["properties"]["hashtags"]["type"], "ARRAY");
    }

    #[test]
    fn endpoint_url_construction() {
        assert_eq!(
            client().endpoint_url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn extract_text_concatenates_parts() {
        let envelope = json!({
            "candidates": [{
                "content": { "parts": [{ "text": "{\"a\":" }, { "text": "1}" }] }
            }]
        });
        assert_eq!(extract_text(&envelope).unwrap(), "{\"a\":1}");
    }

    #[test]
    fn extract_text_empty_is_empty_response() {
        let no_candidates = json!({ "candidates": [] });
        assert!(matches!(
            extract_text(&no_candidates),
            Err(AnalysisError::EmptyResponse)
        ));

        let blank_text = json!({
            "candidates": [{ "content": { "parts": [{ "text": "  " }] } }]
        });
        assert!(matches!(
            extract_text(&blank_text),
            Err(AnalysisError::EmptyResponse)
        ));
    }

    #[test]
    fn parse_reading_accepts_schema_conformant_json() {
        let text = r##"{
            "vibeTitle": "Sunny Drift",
            "auraColorHex": "#FFAA00",
            "description": "과즙미 넘치는 무드예요.",
            "energyLevel": 80,
            "hashtags": ["a", "b", "c"],
            "spiritEmoji": "✨"
        }"##;
        let reading = parse_reading(text).unwrap();
        assert_eq!(reading.vibe_title, "Sunny Drift");
        assert_eq!(reading.energy_level, 80);
    }

    #[test]
    fn parse_reading_rejects_invalid_json() {
        assert!(matches!(
            parse_reading("not json{{{"),
            Err(AnalysisError::Validation(_))
        ));
    }

    #[test]
    fn parse_reading_rejects_out_of_range_energy() {
        let text = r##"{
            "vibeTitle": "x",
            "auraColorHex": "#FFAA00",
            "description": "y",
            "energyLevel": 101,
            "hashtags": ["a", "b", "c"],
            "spiritEmoji": "✨"
        }"##;
        assert!(matches!(
            parse_reading(text),
            Err(AnalysisError::Validation(_))
        ));
    }

    #[test]
    fn parse_reading_rejects_two_hashtags() {
        let text = r##"{
            "vibeTitle": "x",
            "auraColorHex": "#FFAA00",
            "description": "y",
            "energyLevel": 50,
            "hashtags": ["a", "b"],
            "spiritEmoji": "✨"
        }"##;
        assert!(matches!(
            parse_reading(text),
            Err(AnalysisError::Validation(_))
        ));
    }

    #[test]
    fn client_name() {
        assert_eq!(client().name(), "gemini-vision");
    }
}
