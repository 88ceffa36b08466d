//! Satchel Chat — a single conversational entry point over the
//! repository. Routes each message to search or capture.

pub mod router;

pub use router::{IntentRouter, Routed};
