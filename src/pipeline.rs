//! Wires the normalizer, scorer, classifier, CRM publisher and trigger
//! evaluator into one pass over an event.

use crate::api::client::TagPublisher;
use crate::api::events::InboundEvent;
use crate::api::models::{CrmUpdateResult, TagUpdate};
use crate::config::RelayConfig;
use crate::priority::{Priority, classify_priority};
use crate::scoring::{ScoringRules, score_breakdown};
use crate::trigger::{TriggerDecision, evaluate_cma_trigger};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// The pure part of processing: everything except the CRM call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assessment {
    pub score: u8,
    pub priority: Priority,
    pub trigger: TriggerDecision,
}

pub fn assess(event: &InboundEvent, rules: &ScoringRules, template: &str, now: DateTime<Utc>) -> Assessment {
    let breakdown = score_breakdown(event.kind(), &event.payload, rules, now);
    log::debug!(
        "score for {:?}: base={} recency={} repeat={} total={}",
        event.event_type,
        breakdown.base,
        breakdown.recency,
        breakdown.repeat,
        breakdown.total
    );
    let priority = classify_priority(breakdown.total);
    let trigger = evaluate_cma_trigger(breakdown.total, priority, &event.payload, template);
    Assessment {
        score: breakdown.total,
        priority,
        trigger,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedEvent {
    pub contact_id: String,
    pub event_type: String,
    pub engagement_score: u8,
    pub priority: Priority,
    pub fub_update: CrmUpdateResult,
    pub cma_trigger: TriggerDecision,
    pub processed_at: String,
}

pub struct Pipeline<P> {
    publisher: P,
    rules: ScoringRules,
    template: String,
}

impl<P: TagPublisher> Pipeline<P> {
    pub fn new(publisher: P, rules: ScoringRules, template: impl Into<String>) -> Self {
        Self {
            publisher,
            rules,
            template: template.into(),
        }
    }

    pub fn from_config(publisher: P, config: &RelayConfig) -> Self {
        Self::new(publisher, config.scoring.clone(), config.cma.default_template.clone())
    }

    pub async fn process(&self, event: &InboundEvent) -> ProcessedEvent {
        self.process_at(event, Utc::now()).await
    }

    /// Same as [`Pipeline::process`] with an explicit clock.
    pub async fn process_at(&self, event: &InboundEvent, now: DateTime<Utc>) -> ProcessedEvent {
        log::info!("processing {:?} for contact {:?}", event.event_type, event.contact_id);

        let Assessment { score, priority, trigger } = assess(event, &self.rules, &self.template, now);

        let update = TagUpdate::for_score(score, priority);
        let fub_update = self.publisher.publish_tags(&event.contact_id, &update).await;
        if let Some(err) = &fub_update.error {
            log::warn!("CRM tag update failed for contact {:?}: {}", event.contact_id, err);
        }

        if trigger.should_trigger {
            log::info!("CMA trigger for contact {:?}: {}", event.contact_id, trigger.reason);
        }

        ProcessedEvent {
            contact_id: event.contact_id.clone(),
            event_type: event.event_type.clone(),
            engagement_score: score,
            priority,
            fub_update,
            cma_trigger: trigger,
            processed_at: now.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// A publisher that never calls out. Used when no CRM token is configured.
pub struct DisabledPublisher;

#[async_trait::async_trait]
impl TagPublisher for DisabledPublisher {
    async fn publish_tags(&self, _contact_id: &str, _update: &TagUpdate) -> CrmUpdateResult {
        CrmUpdateResult::failed("CRM integration not configured")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::events::EventPayload;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn assess_is_deterministic_for_a_fixed_clock() {
        let now = Utc::now();
        let event = InboundEvent::normalize(&json!({
            "eventType": "phone_call",
            "contactId": "9",
            "data": { "interactionCount": 3, "propertyAddress": "1 Main St" }
        }));
        let a = assess(&event, &ScoringRules::default(), "T.html", now);
        let b = assess(&event, &ScoringRules::default(), "T.html", now);
        assert_eq!(a, b);
        assert_eq!(a.score, 50);
        assert_eq!(a.priority, Priority::Warm);
        assert!(!a.trigger.should_trigger);
    }

    #[tokio::test]
    async fn disabled_publisher_degrades() {
        let pipeline = Pipeline::from_config(DisabledPublisher, &RelayConfig::default());
        let out = pipeline
            .process(&InboundEvent::new("email_click", "1", EventPayload::default()))
            .await;
        assert_eq!(out.engagement_score, 25);
        assert_eq!(out.priority, Priority::Cold);
        assert!(!out.fub_update.success);
        assert_eq!(out.cma_trigger.suggested_template, "GLENN_PERFECT_CMA_FINAL_DEFAULT.html");
    }
}
