use serde::{Deserialize, Serialize};

use crate::types::{Role, Turn};

/// A single text part of a content entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Part {
    /// The text of the part.
    pub text: String,
}

impl Part {
    /// Creates a new text part.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// One entry of the `contents` array of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    /// Who produced this entry.
    pub role: Role,

    /// The parts of this entry.  markchat always sends exactly one.
    pub parts: Vec<Part>,
}

impl From<&Turn> for Content {
    fn from(turn: &Turn) -> Self {
        Self {
            role: turn.role(),
            parts: vec![Part::new(turn.text())],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, to_value};

    #[test]
    fn content_from_turn() {
        let content = Content::from(&Turn::model("**hi**"));
        assert_eq!(
            to_value(&content).unwrap(),
            json!({
                "role": "model",
                "parts": [{"text": "**hi**"}]
            })
        );
    }
}
