//! # asrgot
//!
//! HTTP API and CLI over the ASR-GoT research reasoning engine.
//!
//! - [`api`]: axum router, handlers and request/response types
//! - [`cli`]: clap commands and the scripted pipeline runner

pub mod api;
pub mod cli;
