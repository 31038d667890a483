//! Business logic layer.
//!
//! Orchestrates the two user workflows, uploading an audio file and
//! generating speech, on top of the `api` traits. Called by the `commands`
//! layer; delegates HTTP interactions to `api` and persistence to `storage`.

pub mod progress;
pub mod synthesis_engine;
pub mod upload_engine;
