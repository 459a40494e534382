//! termfolio - terminal-style portfolio with an OpenRouter-backed assistant
//!
//! A session owns the transcript and the Idle/Executing state; the
//! interpreter resolves command names against the registry; the delegate
//! answers `ask` through a completion backend or falls back to demo text.
//! The TUI (`ui`) and the HTTP server (`server`) are two presentations of
//! the same session.

pub mod client;
pub mod commands;
pub mod config;
pub mod delegate;
pub mod history;
pub mod interpreter;
pub mod logging;
pub mod pages;
pub mod profile;
pub mod prompt;
pub mod record;
pub mod server;
pub mod session;
pub mod typewriter;
pub mod ui;
