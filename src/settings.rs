use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Environment variables probed for the model credential, in order.
const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Model API key. Usually left empty in the file and resolved from the
    /// environment at startup.
    #[serde(default)]
    pub api_key: String,
    pub model: String,
    pub temperature: f32,
    /// System-level persona instruction.
    pub persona: String,
    /// The analysis instruction that accompanies every photo.
    pub instruction: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.5-flash".into(),
            temperature: 1.1,
            persona: "당신은 한국의 MZ세대 트렌드를 꿰뚫고 있는 AI 퍼스널 무드 분석가입니다. 친근하고 부드러운 '해요'체를 사용하세요.".into(),
            instruction: "이 사진 속 인물의 '분위기'와 '오라(Aura)'를 분석해줘. 한국의 2030 세대가 인스타그램에서 쓸법한 트렌디하고 감성적인 말투로 작성해줘. 칭찬을 베이스로 하되 재치있게 표현해줘.".into(),
        }
    }
}

impl Settings {
    /// Load settings from a TOML file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path).map_err(|e| e.to_string())?;
        toml::from_str(&content).map_err(|e| e.to_string())
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).map_err(|e| e.to_string())?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        fs::write(path, content).map_err(|e| e.to_string())?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Fill in the API key from the environment when the file carried none.
    /// A missing key is a warning, not a crash: requests will simply fail
    /// until one is provided.
    pub fn resolve_api_key(mut self) -> Self {
        if !self.api_key.is_empty() {
            return self;
        }
        for var in API_KEY_ENV_VARS {
            if let Ok(key) = std::env::var(var) {
                if !key.is_empty() {
                    self.api_key = key;
                    return self;
                }
            }
        }
        log::warn!(
            "API key is missing. Set GEMINI_API_KEY or API_KEY — analysis requests will fail."
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_product_configuration() {
        let s = Settings::default();
        assert_eq!(s.model, "gemini-2.5-flash");
        assert!((s.temperature - 1.1).abs() < 1e-6);
        assert!(s.api_key.is_empty());
        assert!(s.persona.contains("무드 분석가"));
        assert!(s.instruction.contains("오라(Aura)"));
    }

    #[test]
    fn toml_round_trip() {
        let mut s = Settings::default();
        s.api_key = "k-123".into();
        s.temperature = 0.7;

        let text = toml::to_string_pretty(&s).unwrap();
        // Keys are camelCase, same casing the UI layer sees.
        assert!(text.contains("apiKey"));
        let back: Settings = toml::from_str(&text).unwrap();
        assert_eq!(back.api_key, "k-123");
        assert!((back.temperature - 0.7).abs() < 1e-6);
        assert_eq!(back.model, s.model);
    }

    #[test]
    fn load_missing_file_yields_defaults() {
        let path = std::env::temp_dir().join("moodcam-settings-that-do-not-exist.toml");
        let s = Settings::load(&path).unwrap();
        assert_eq!(s.model, Settings::default().model);
    }

    #[test]
    fn save_then_load() {
        let path = std::env::temp_dir().join(format!("moodcam-settings-{}.toml", std::process::id()));
        let mut s = Settings::default();
        s.model = "gemini-2.5-pro".into();
        s.save(&path).unwrap();

        let back = Settings::load(&path).unwrap();
        assert_eq!(back.model, "gemini-2.5-pro");
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn resolve_api_key_prefers_file_then_env() {
        let mut s = Settings::default();
        s.api_key = "from-file".into();
        assert_eq!(s.resolve_api_key().api_key, "from-file");

        std::env::set_var("GEMINI_API_KEY", "from-env");
        let resolved = Settings::default().resolve_api_key();
        assert_eq!(resolved.api_key, "from-env");
        std::env::remove_var("GEMINI_API_KEY");
    }
}
