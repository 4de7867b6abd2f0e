use std::fmt;

use serde::{Deserialize, Serialize};

/// Business entity classification driving the tax strategy dispatch.
///
/// The set is closed: every supported strategy has a variant, and tags that do
/// not map onto one are rejected at the parse boundary instead of falling back
/// to a default strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    SoleProprietorship,
    SCorporation,
    CCorporation,
    Partnership,
}

impl EntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::SoleProprietorship => "sole_proprietorship",
            EntityType::SCorporation => "s_corporation",
            EntityType::CCorporation => "c_corporation",
            EntityType::Partnership => "partnership",
        }
    }

    /// Maps external entity tags onto a strategy. Single-member LLCs share the
    /// sole-proprietorship treatment and multi-member LLCs the partnership one.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sole_proprietorship" | "single_member_llc" => Some(EntityType::SoleProprietorship),
            "s_corporation" | "s_corp" => Some(EntityType::SCorporation),
            "c_corporation" | "c_corp" | "corporation" => Some(EntityType::CCorporation),
            "partnership" | "multi_member_llc" => Some(EntityType::Partnership),
            _ => None,
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
