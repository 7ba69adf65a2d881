//! Core library for music-link-responder
pub mod config;
pub mod error;
pub mod models;
pub mod classify;
pub mod query;
pub mod api;
pub mod resolve;
pub mod notify;
pub mod handler;
