#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    System,
    User,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 2000;
const REASONING_MAX_TOKENS: u32 = 8000;

const REASONING_MODEL_MARKERS: &[&str] = &[":thinking", "deepseek-r1", "/o1", "/o3", "/o4"];

pub fn is_reasoning_model(model: &str) -> bool {
    let lowered = model.to_ascii_lowercase();
    REASONING_MODEL_MARKERS
        .iter()
        .any(|marker| lowered.contains(marker))
}

impl Sampling {
    pub fn for_model(model: &str) -> Self {
        if is_reasoning_model(model) {
            Self {
                temperature: None,
                max_tokens: REASONING_MAX_TOKENS,
            }
        } else {
            Self {
                temperature: Some(DEFAULT_TEMPERATURE),
                max_tokens: DEFAULT_MAX_TOKENS,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageRole, Sampling, is_reasoning_model};

    #[test]
    fn role_names_match_chat_api() {
        assert_eq!(MessageRole::System.as_str(), "system");
        assert_eq!(MessageRole::User.as_str(), "user");
    }

    #[test]
    fn reasoning_models_are_detected_by_id() {
        assert!(is_reasoning_model("deepseek/deepseek-r1"));
        assert!(is_reasoning_model("openai/o3-mini"));
        assert!(is_reasoning_model("anthropic/claude-3.7-sonnet:thinking"));
        assert!(!is_reasoning_model("google/gemini-2.5-flash"));
    }

    #[test]
    fn sampling_drops_temperature_for_reasoning_models() {
        let regular = Sampling::for_model("google/gemini-2.5-flash");
        assert_eq!(regular.temperature, Some(0.7));
        assert_eq!(regular.max_tokens, 2000);

        let reasoning = Sampling::for_model("deepseek/deepseek-r1");
        assert_eq!(reasoning.temperature, None);
        assert!(reasoning.max_tokens > regular.max_tokens);
    }
}
