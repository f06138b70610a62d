//! Builtin content packs.
//!
//! A pack is an immutable, versioned payload compiled into the binary:
//! keyword-triggered reply entries, a reply-body table keyed by language, a
//! default greeting, and static knowledge-base content. Entry identity is
//! its 1-based position in the pack; positions never change within a pack
//! version, and bumping the version string is the only sanctioned re-seed.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::rule::VersionTag;

pub const ADVISOR_PACK: &str = "advisor";
pub const ADVISOR_PACK_VERSION: &str = "builtin:advisor:keywords:v1";

const ADVISOR_KEYWORDS_RAW: &str = include_str!("pack/advisor_keywords.json");
const ADVISOR_REPLIES_RAW: &str = include_str!("pack/advisor_replies.json");
const ADVISOR_KNOWLEDGE_RAW: &str = include_str!("pack/advisor_context.md");

const ADVISOR_GREETING: &str = "Hello! I'm Advisor, the brokerage onboarding assistant. \
Ask me about opening a trading account, required documents, fees, trading hours, \
or the list of registered brokers.";

/// Inclusive delay window (seconds) applied before a reply is sent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min: u32,
    pub max: u32,
}

/// One builtin rule entry: keyword fragments that must all appear (any
/// order), the reply it resolves to, and its delivery delay window.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct KeywordEntry {
    pub keywords: Vec<String>,
    pub reply_id: String,
    pub language: String,
    pub delay_range: DelayRange,
}

#[derive(Deserialize)]
struct KeywordFile {
    responses: Vec<KeywordEntry>,
}

type ReplyTable = HashMap<String, HashMap<String, String>>;

#[derive(Debug, Error)]
pub enum PackError {
    #[error("could not parse keyword entries for pack `{pack}`: {source}")]
    ParseKeywords { pack: String, source: serde_json::Error },
    #[error("could not parse reply table for pack `{pack}`: {source}")]
    ParseReplies { pack: String, source: serde_json::Error },
    #[error("invalid entry #{sequence} in pack `{pack}`: {reason}")]
    InvalidEntry { pack: String, sequence: usize, reason: String },
}

#[derive(Clone, Debug)]
pub struct ContentPack {
    name: String,
    version: String,
    entries: Vec<KeywordEntry>,
    replies: ReplyTable,
    greeting: String,
    knowledge: String,
}

impl ContentPack {
    /// The builtin advisor pack shipped with this binary.
    pub fn advisor() -> Result<Self, PackError> {
        Self::from_parts(
            ADVISOR_PACK,
            ADVISOR_PACK_VERSION,
            ADVISOR_KEYWORDS_RAW,
            ADVISOR_REPLIES_RAW,
            ADVISOR_GREETING,
            ADVISOR_KNOWLEDGE_RAW,
        )
    }

    /// Parse and validate a pack from its raw payload parts. A malformed
    /// payload or an inverted delay range is fatal; no partial pack is ever
    /// returned.
    pub fn from_parts(
        name: &str,
        version: &str,
        keywords_json: &str,
        replies_json: &str,
        greeting: &str,
        knowledge: &str,
    ) -> Result<Self, PackError> {
        let keyword_file: KeywordFile = serde_json::from_str(keywords_json)
            .map_err(|source| PackError::ParseKeywords { pack: name.to_string(), source })?;
        let replies: ReplyTable = serde_json::from_str(replies_json)
            .map_err(|source| PackError::ParseReplies { pack: name.to_string(), source })?;

        for (index, entry) in keyword_file.responses.iter().enumerate() {
            if entry.delay_range.min > entry.delay_range.max {
                return Err(PackError::InvalidEntry {
                    pack: name.to_string(),
                    sequence: index + 1,
                    reason: format!(
                        "delay range min {} exceeds max {}",
                        entry.delay_range.min, entry.delay_range.max
                    ),
                });
            }
        }

        Ok(Self {
            name: name.to_string(),
            version: version.to_string(),
            entries: keyword_file.responses,
            replies,
            greeting: greeting.to_string(),
            knowledge: knowledge.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Pack name with its first letter upper-cased, used in human-facing
    /// rule and artifact names.
    pub fn display_name(&self) -> String {
        let mut chars = self.name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }

    /// Well-known name of the always-refreshed knowledge-base artifact.
    pub fn knowledge_name(&self) -> String {
        format!("{} Knowledge Base", self.display_name())
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn entries(&self) -> &[KeywordEntry] {
        &self.entries
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn knowledge(&self) -> &str {
        &self.knowledge
    }

    /// Reconciliation key for the entry at `index` (0-based); sequence
    /// numbers in tags are 1-based.
    pub fn version_tag_for_entry(&self, index: usize) -> VersionTag {
        VersionTag::new(&self.version, index + 1)
    }

    /// Resolve a reply body. Returns `None` when the reply id or language
    /// is absent, or when the body is blank after trimming; callers skip
    /// such entries without error.
    pub fn reply_body(&self, reply_id: &str, language: &str) -> Option<&str> {
        let body = self.replies.get(reply_id)?.get(language)?.trim();
        (!body.is_empty()).then_some(body)
    }
}
