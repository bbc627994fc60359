//! Knowledge entries: the static repair topics the assistant draws on.

use serde::{Deserialize, Serialize};

/// One repair topic.
///
/// Entries are loaded once at startup and never mutated. The title doubles as
/// the entry's identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeEntry {
    /// Topic title, unique within a store
    pub title: String,

    /// Lower-case match terms
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Body text injected into the prompt on a strong match
    pub content: String,

    /// Ordered procedure steps, if the topic is a procedure
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<String>,

    /// Linked documents and media
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<Assets>,
}

/// Documents and media linked to an entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Assets {
    /// True when no asset link is set.
    pub fn is_empty(&self) -> bool {
        self.pdf.is_none() && self.video.is_none() && self.image.is_none()
    }
}
