//! ArionComply Console library.
//!
//! The axum service behind the console: server-rendered pages in the
//! layout the path asks for, session-backed identity and UI state, and the
//! compliance proxy in front of `OpenAI` and Claude.
//!
//! # Security
//!
//! The proxy holds provider API keys. They never leave the server and are
//! redacted from `Debug` output.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod llm;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;

pub use routes::app;
