use serde::{Deserialize, Serialize};

use crate::types::{Content, Turn};

/// Body of a `generateContent` request.
///
/// The request always carries the full conversation, oldest turn first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerateContentRequest {
    /// The conversation so far.
    pub contents: Vec<Content>,
}

impl GenerateContentRequest {
    /// Creates a request from a history snapshot.
    pub fn from_turns(turns: &[Turn]) -> Self {
        Self {
            contents: turns.iter().map(Content::from).collect(),
        }
    }
}
