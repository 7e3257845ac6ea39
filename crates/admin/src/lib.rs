//! Fernway Admin library.
//!
//! This crate provides the shop administration panel as a library, allowing
//! the binary, the CLI, and the integration tests to share it.
//!
//! # Architecture
//!
//! - Axum web framework with askama server-side templates
//! - `PostgreSQL` via sqlx for users and products
//! - tower-sessions (`PostgreSQL`-backed) for login sessions
//! - ImageKit for hosted product images

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
