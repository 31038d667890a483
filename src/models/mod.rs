//! Data models for mp3-host.
//!
//! Persisted records (credentials, upload history) and the transient values
//! that flow through one upload or synthesis run.

pub mod file;
pub mod history;
pub mod settings;
pub mod synthesis;
pub mod upload;
