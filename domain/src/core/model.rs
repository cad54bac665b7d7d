//! Model value object representing a backend LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Models the backend knows how to serve (Value Object)
///
/// The backend forwards the identifier verbatim to its Ollama runtime, so any
/// unknown identifier is kept as [`Model::Custom`] instead of being rejected.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    Llama2,
    Llama32,
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Llama2 => "llama2",
            Model::Llama32 => "llama3.2",
            Model::Custom(s) => s,
        }
    }

    /// Models offered in the model picker
    pub fn supported() -> Vec<Model> {
        vec![Model::Llama2, Model::Llama32]
    }

    /// Human-readable label
    pub fn display_name(&self) -> &str {
        match self {
            Model::Llama2 => "Llama 2",
            Model::Llama32 => "Llama 3.2",
            Model::Custom(s) => s,
        }
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Model::Custom(_))
    }
}

impl Default for Model {
    /// Returns the default model (llama2)
    fn default() -> Self {
        Model::Llama2
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s.trim() {
            "llama2" => Model::Llama2,
            "llama3.2" => Model::Llama32,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let Ok(model) = s.parse::<Model>();
        Ok(model)
    }
}
