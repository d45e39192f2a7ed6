//! # BK Harness
//!
//! A command-line test harness for the BK document and knowledge-base API.
//!
//! The harness has no algorithmic core of its own: ingestion, embedding,
//! hybrid ranking and answer synthesis all live in the backend. This crate
//! forwards user input to the REST endpoints and renders what comes back.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌───────────┐   ┌──────────┐
//! │  bkh CLI   │──▶│ Controller │──▶│   Views   │──▶│ ApiClient│
//! │  (clap)    │   │ auth gate  │   │ one form  │   │ endpoints│
//! └────────────┘   └────────────┘   │ per call  │   └────┬─────┘
//!                                   └───────────┘        ▼
//!                  ┌──────────────┐               ┌───────────┐
//!                  │ SessionStore │◀──── token ───│  Gateway  │──▶ backend
//!                  └──────────────┘               └───────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and form defaults |
//! | [`session`] | Bearer-token persistence |
//! | [`gateway`] | The single HTTP request function |
//! | [`error`] | Structured request errors |
//! | [`models`] | Endpoint request/response schemas |
//! | [`api`] | One typed call per endpoint |
//! | [`views`] | Auth, Uploader, Docs, Search, Ask forms |
//! | [`controller`] | Authentication gate over the views |

pub mod api;
pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod models;
pub mod session;
pub mod views;
