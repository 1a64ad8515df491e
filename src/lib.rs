//! # inkpad
//!
//! A self-hosted note-taking server with AI-assisted summarization, titling,
//! and elaboration.
//!
//! inkpad persists notes (title, body, tags, and AI-derived fields) to a
//! local SQLite database, exposes them through a JSON HTTP API, serves a
//! static browser frontend, and proxies three fixed prompt templates to an
//! external generative-text API, storing the returned text back onto the
//! note.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────┐   ┌───────────┐   ┌────────────┐   ┌────────┐
//! │ Browser  │──▶│ HTTP API  │──▶│ Repository │──▶│ SQLite │
//! │ frontend │   │  (axum)   │   └────────────┘   └────────┘
//! └──────────┘   │           │──▶┌────────────┐
//!                └───────────┘   │ LLM gateway│──▶ upstream API
//!                                └────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! inkpad init                   # create database
//! LLM_API_KEY=... inkpad serve  # start the server
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration with env overrides |
//! | [`models`] | Note data types and request payloads |
//! | [`repo`] | Note persistence over SQLite |
//! | [`llm`] | Gateway to the generative-text API and prompt templates |
//! | [`server`] | HTTP API and static frontend |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`error`] | Crate-wide error taxonomy |

pub mod config;
pub mod db;
pub mod error;
pub mod llm;
pub mod migrate;
pub mod models;
pub mod repo;
pub mod server;
