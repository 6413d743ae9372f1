//! services/api/src/lib.rs
//!
//! HTTP service for the sales deck backend: adapters for Postgres, the session
//! exchange provider and the chat model, plus the axum web layer.

pub mod adapters;
pub mod config;
pub mod error;
pub mod web;
