//! Telegram post statistics service
//!
//! A thin orchestration layer: one long-lived MTProto session, a handful of
//! read-only RPCs per request, and a JSON façade on top.

pub mod config;
pub mod errors;
pub mod fetcher;
pub mod models;
pub mod telegram;
pub mod url_parser;
pub mod web;
