//! Core pipeline for Pulsefeed: retrieval-augmented chat, the feed cache,
//! and the live-update broadcast hub.
//!
//! Storage and generation backends are held behind the [`store::SummaryStore`]
//! and [`generation::Generator`] traits; concrete implementations live in
//! `pulsefeed-infra`. This crate never depends on infra.

pub mod engine;
pub mod feed_cache;
pub mod generation;
pub mod hub;
pub mod prompt;
pub mod retriever;
pub mod session;
pub mod store;
