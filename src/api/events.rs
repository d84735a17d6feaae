//! Inbound Fello webhook events.
//!
//! Webhook bodies are loosely shaped, so nothing here deserializes them
//! with a strict schema. `InboundEvent::normalize` walks the raw JSON and
//! falls back to a default for every field that is missing or has the
//! wrong type. It cannot fail.

use serde_json::{Map, Value};

/// Known Fello engagement events. Anything else is `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    DashboardView,
    EmailOpen,
    EmailClick,
    FormSubmission,
    PhoneCall,
    TextResponse,
    PropertyView,
    ScheduleAppointment,
    Unknown,
}

impl EventKind {
    pub fn parse(event_type: &str) -> Self {
        match event_type {
            "dashboard_view" => EventKind::DashboardView,
            "email_open" => EventKind::EmailOpen,
            "email_click" => EventKind::EmailClick,
            "form_submission" => EventKind::FormSubmission,
            "phone_call" => EventKind::PhoneCall,
            "text_response" => EventKind::TextResponse,
            "property_view" => EventKind::PropertyView,
            "schedule_appointment" => EventKind::ScheduleAppointment,
            _ => EventKind::Unknown,
        }
    }
}

/// The `data` object of a webhook, with the fields the relay looks at
/// pulled out. Everything else is kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPayload {
    pub timestamp: Option<String>,
    pub interaction_count: Option<i64>,
    pub property_address: Option<String>,
    pub form_type: Option<String>,
    pub extra: Map<String, Value>,
}

impl EventPayload {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };
        let mut payload = Self::default();
        for (key, val) in obj {
            match key.as_str() {
                "timestamp" => payload.timestamp = val.as_str().map(str::to_string),
                "interactionCount" => payload.interaction_count = as_count(val),
                "propertyAddress" => payload.property_address = val.as_str().map(str::to_string),
                "formType" => payload.form_type = val.as_str().map(str::to_string),
                _ => {
                    payload.extra.insert(key.clone(), val.clone());
                }
            }
        }
        payload
    }

    /// Defaults to 1 when absent or not a number.
    pub fn interaction_count(&self) -> i64 {
        self.interaction_count.unwrap_or(1)
    }

    pub fn property_address(&self) -> &str {
        self.property_address.as_deref().unwrap_or("")
    }

    pub fn form_type(&self) -> &str {
        self.form_type.as_deref().unwrap_or("")
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.timestamp.as_deref().filter(|s| !s.is_empty())
    }
}

// Fractional counts are truncated; anything non-numeric reads as absent.
fn as_count(val: &Value) -> Option<i64> {
    val.as_i64()
        .or_else(|| val.as_u64().map(|n| i64::try_from(n).unwrap_or(i64::MAX)))
        .or_else(|| val.as_f64().filter(|f| f.is_finite()).map(|f| f as i64))
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InboundEvent {
    pub event_type: String,
    pub contact_id: String,
    pub payload: EventPayload,
}

impl InboundEvent {
    pub fn new(event_type: impl Into<String>, contact_id: impl Into<String>, payload: EventPayload) -> Self {
        Self {
            event_type: event_type.into(),
            contact_id: contact_id.into(),
            payload,
        }
    }

    /// Builds an event from a raw webhook body. `data` is preferred over
    /// `payload` when both are present.
    pub fn normalize(raw: &Value) -> Self {
        let event_type = raw
            .get("eventType")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let contact_id = match raw.get("contactId") {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        };
        let payload = raw
            .get("data")
            .filter(|v| v.is_object())
            .or_else(|| raw.get("payload"))
            .map(EventPayload::from_value)
            .unwrap_or_default();
        Self {
            event_type,
            contact_id,
            payload,
        }
    }

    pub fn kind(&self) -> EventKind {
        EventKind::parse(&self.event_type)
    }
}
