//! Satchel Core — capture data model, configuration, error taxonomy.

pub mod capture;
pub mod config;
pub mod error;

pub use capture::{
    now, summarize, ActionTaken, Capture, CaptureContext, Category, Classified, ContentType,
    Entity, EntityType, LeadData, Priority, ShowData, ShowStatus, SimpleType, TaskData,
};
pub use config::{DataPaths, SatchelConfig};
pub use error::{Error, Result};
