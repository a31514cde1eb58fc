//! Conversation modules.
//!
//! This module turns Dialogflow fulfillment requests into replies:
//! intent routing, request parsing, the per-turn handler, and the
//! fulfillment response encoding.

pub mod handler;
pub mod intent;
pub mod request;
pub mod response;

pub use handler::FulfillmentHandler;
pub use request::WebhookRequest;
pub use response::FulfillmentResponse;
