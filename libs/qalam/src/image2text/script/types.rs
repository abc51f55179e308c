use serde::{Deserialize, Serialize};

/// Dominant writing system of a page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ScriptHint {
    Latin,
    Arabic,
    Mixed,
}

impl ScriptHint {
    /// Maps a script name reported by the engine. Anything other than Latin
    /// or Arabic resolves to `Mixed`.
    pub fn from_script_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "latin" => ScriptHint::Latin,
            "arabic" => ScriptHint::Arabic,
            _ => ScriptHint::Mixed,
        }
    }

    /// Language model selector handed to the recognizer.
    pub fn language_selector(&self) -> &'static str {
        match self {
            ScriptHint::Latin => "eng",
            ScriptHint::Arabic => "ara",
            ScriptHint::Mixed => "eng+ara",
        }
    }
}

impl std::fmt::Display for ScriptHint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScriptHint::Latin => write!(f, "Latin"),
            ScriptHint::Arabic => write!(f, "Arabic"),
            ScriptHint::Mixed => write!(f, "Mixed"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScriptDetection {
    pub hint: ScriptHint,
    pub confidence: Option<f32>,
}

impl ScriptDetection {
    pub fn new(hint: ScriptHint, confidence: Option<f32>) -> Self {
        Self { hint, confidence }
    }

    pub fn fallback() -> Self {
        Self::new(ScriptHint::Mixed, None)
    }
}
