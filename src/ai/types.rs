use serde::{Deserialize, Serialize};

/// Error type for analysis operations.
///
/// All three variants are treated identically at the session boundary: the
/// analysis either fully satisfies the schema or it failed. No partial
/// results, no retry.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Network failure or non-2xx response, propagated unchanged.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The model returned no text at all.
    #[error("model returned no content")]
    EmptyResponse,
    /// Text was returned but does not satisfy the reading schema.
    #[error("invalid reading: {0}")]
    Validation(String),
}

/// The validated structured output describing the detected mood/aura.
///
/// Field names on the wire match the response schema sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuraReading {
    /// Short, trendy title for the vibe (3-5 words).
    pub vibe_title: String,
    /// Representative color, `#RRGGBB`.
    pub aura_color_hex: String,
    /// Free-text, upbeat description of the person's mood.
    pub description: String,
    /// Energy level, 1–100 inclusive.
    pub energy_level: u8,
    /// Exactly three short hashtags, order preserved, no leading `#`.
    pub hashtags: Vec<String>,
    /// One emoji that captures the vibe.
    pub spirit_emoji: String,
}

impl AuraReading {
    /// Check every field constraint. A reading that fails here is treated as
    /// a total analysis failure; it never reaches the session.
    pub fn validate(&self) -> Result<(), String> {
        if self.vibe_title.trim().is_empty() {
            return Err("vibeTitle is empty".into());
        }
        if !is_hex_color(&self.aura_color_hex) {
            return Err(format!(
                "auraColorHex {:?} is not a #RRGGBB color",
                self.aura_color_hex
            ));
        }
        if self.description.trim().is_empty() {
            return Err("description is empty".into());
        }
        if !(1..=100).contains(&self.energy_level) {
            return Err(format!(
                "energyLevel {} outside 1..=100",
                self.energy_level
            ));
        }
        if self.hashtags.len() != 3 {
            return Err(format!("expected 3 hashtags, got {}", self.hashtags.len()));
        }
        if self.hashtags.iter().any(|t| t.trim().is_empty()) {
            return Err("hashtags contain an empty tag".into());
        }
        if self.spirit_emoji.trim().is_empty() {
            return Err("spiritEmoji is empty".into());
        }
        Ok(())
    }

    /// Message body for the share sheet.
    pub fn share_text(&self) -> String {
        format!(
            "오늘 나의 무드는 \"{}\" {}\n#무드체크 #AI분석",
            self.vibe_title, self.spirit_emoji
        )
    }

    /// Shorter one-liner for the clipboard fallback.
    pub fn clipboard_text(&self) -> String {
        format!("오늘 나의 무드: {} {}", self.vibe_title, self.spirit_emoji)
    }
}

/// `#` followed by exactly six hex digits.
fn is_hex_color(s: &str) -> bool {
    let Some(digits) = s.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.chars().all(|c| c.is_ascii_hexdigit())
}
