use serde::{Deserialize, Serialize};

/// A rich card, rendered by clients as a framed block with a title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: Option<u32>,
    /// Unix epoch milliseconds.
    pub timestamp: Option<i64>,
}

impl Embed {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    pub fn timestamp(mut self, millis: i64) -> Self {
        self.timestamp = Some(millis);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Content {
    Text(String),
    Embed(Embed),
}

impl Content {
    pub fn text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(text),
            Content::Embed(_) => None,
        }
    }

    pub fn embed(&self) -> Option<&Embed> {
        match self {
            Content::Embed(embed) => Some(embed),
            Content::Text(_) => None,
        }
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

impl From<Embed> for Content {
    fn from(embed: Embed) -> Self {
        Content::Embed(embed)
    }
}
