//! Fello engagement relay: scores webhook events, tags the contact in
//! Follow Up Boss and decides whether a CMA should be generated.

pub mod api;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod priority;
pub mod scoring;
pub mod trigger;
pub mod utils;
pub mod webhook;

pub use api::client::{FubClient, TagPublisher};
pub use api::events::{EventKind, EventPayload, InboundEvent};
pub use api::models::{CrmUpdateResult, TagUpdate};
pub use config::RelayConfig;
pub use error::{RelayError, Result};
pub use pipeline::{Pipeline, ProcessedEvent};
pub use priority::Priority;
pub use trigger::TriggerDecision;
