//! mp3-host: publish MP3 files through a GitHub repository and generate
//! speech with a hosted TTS model.
//!
//! The crate is layered the same way top to bottom:
//! `commands` (front-end handlers) → `services` (workflows) →
//! `api` (remote services) and `storage` (local JSON state).

pub mod api;
pub mod commands;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
