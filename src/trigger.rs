//! CMA trigger evaluation.
//!
//! Rules are checked in order and the first match decides. They are not
//! cumulative: a high score on a home valuation form still reports the
//! high-score reason.

use crate::api::events::EventPayload;
use crate::priority::Priority;
use serde::Serialize;

pub const HIGH_SCORE_THRESHOLD: u8 = 75;
pub const HOME_VALUATION_FORM: &str = "home_valuation";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerRule {
    HighScore,
    HotPropertyInterest,
    HomeValuationRequest,
}

impl TriggerRule {
    pub fn reason(self) -> &'static str {
        match self {
            TriggerRule::HighScore => "High engagement score indicates immediate interest",
            TriggerRule::HotPropertyInterest => "Hot lead with specific property interest",
            TriggerRule::HomeValuationRequest => "Direct home valuation request",
        }
    }
}

/// Urgency label attached to a trigger decision. Unrelated to [`Priority`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TriggerUrgency {
    High,
    Standard,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerDecision {
    pub should_trigger: bool,
    pub reason: String,
    pub suggested_template: String,
    pub priority: TriggerUrgency,
}

/// First rule that fires, if any.
pub fn matching_rule(score: u8, priority: Priority, payload: &EventPayload) -> Option<TriggerRule> {
    if score >= HIGH_SCORE_THRESHOLD {
        Some(TriggerRule::HighScore)
    } else if priority == Priority::Hot && !payload.property_address().is_empty() {
        Some(TriggerRule::HotPropertyInterest)
    } else if payload.form_type() == HOME_VALUATION_FORM {
        Some(TriggerRule::HomeValuationRequest)
    } else {
        None
    }
}

pub fn evaluate_cma_trigger(score: u8, priority: Priority, payload: &EventPayload, template: &str) -> TriggerDecision {
    let rule = matching_rule(score, priority, payload);
    TriggerDecision {
        should_trigger: rule.is_some(),
        reason: rule.map(TriggerRule::reason).unwrap_or_default().to_string(),
        suggested_template: template.to_string(),
        priority: if rule.is_some() { TriggerUrgency::High } else { TriggerUrgency::Standard },
    }
}
