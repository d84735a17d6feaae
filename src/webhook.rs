//! Response envelopes handed back to whatever HTTP layer fronts the relay.

use crate::api::client::TagPublisher;
use crate::api::events::InboundEvent;
use crate::config::RelayConfig;
use crate::error::Result;
use crate::pipeline::{Pipeline, ProcessedEvent};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

pub const SERVICE_NAME: &str = "WILLOW Engagement Relay";

#[derive(Debug, Clone, Serialize)]
pub struct WebhookEnvelope {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ProcessedEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub timestamp: String,
}

impl WebhookEnvelope {
    pub fn processed(data: ProcessedEvent) -> Self {
        Self {
            success: true,
            message: Some("WILLOW processed Fello webhook successfully".into()),
            data: Some(data),
            error: None,
            timestamp: now_rfc3339(),
        }
    }

    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            success: false,
            message: None,
            data: None,
            error: Some(format!("webhook processing failed: {}", reason)),
            timestamp: now_rfc3339(),
        }
    }

    pub fn status_code(&self) -> u16 {
        if self.success { 200 } else { 500 }
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// A blank body is treated as `{}`; anything else must be valid JSON.
pub fn parse_body(body: &str) -> Result<Value> {
    if body.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_json::from_str(body)?)
}

/// Runs one webhook delivery end to end. Only an unparseable body yields
/// a failure envelope; CRM problems show up inside `data.fubUpdate`.
pub async fn handle_webhook<P: TagPublisher>(pipeline: &Pipeline<P>, body: &str) -> WebhookEnvelope {
    let raw = match parse_body(body) {
        Ok(raw) => raw,
        Err(e) => {
            log::error!("rejecting webhook: {}", e);
            return WebhookEnvelope::failed(e);
        }
    };
    let event = InboundEvent::normalize(&raw);
    WebhookEnvelope::processed(pipeline.process(&event).await)
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub service: &'static str,
    pub status: &'static str,
    pub version: &'static str,
    pub timestamp: String,
    pub components: BTreeMap<&'static str, &'static str>,
}

pub fn health_report(config: &RelayConfig) -> HealthReport {
    let crm = if config.crm.is_configured() { "ACTIVE" } else { "UNCONFIGURED" };
    HealthReport {
        service: SERVICE_NAME,
        status: "OPERATIONAL",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: now_rfc3339(),
        components: BTreeMap::from([
            ("fello_webhook", "ACTIVE"),
            ("intelligence_engine", "ACTIVE"),
            ("fub_integration", crm),
            ("cma_system", "ACTIVE"),
        ]),
    }
}
