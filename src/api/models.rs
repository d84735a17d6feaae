use crate::priority::Priority;
use serde::{Deserialize, Serialize};

pub const TRACKED_TAG: &str = "FELLO_TRACKED";

/// Body of the FUB tag-update call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagUpdate {
    pub tags: Vec<String>,
}

impl TagUpdate {
    pub fn for_score(score: u8, priority: Priority) -> Self {
        Self {
            tags: vec![
                format!("WILLOW_SCORE_{}", score),
                format!("PRIORITY_{}", priority),
                TRACKED_TAG.to_string(),
            ],
        }
    }
}

/// Outcome of pushing tags to the CRM. Failures are carried as data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrmUpdateResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags_updated: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CrmUpdateResult {
    pub fn updated(tags: Vec<String>) -> Self {
        Self {
            success: true,
            tags_updated: Some(tags),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            tags_updated: None,
            error: Some(error.into()),
        }
    }
}
