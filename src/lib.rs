// src/lib.rs

//! AURA chat backend.
//!
//! The crate has two halves:
//!
//! - the **server** ([`api`]): a pass-through handler that forwards chat
//!   requests to the hosted AI gateway and streams the SSE response back,
//!   plus device-scoped conversation CRUD over SQLite;
//! - the **client core** ([`stream`], [`client`]): an incremental decoder
//!   that turns the raw SSE byte stream into text and chart tool-call
//!   events, and the read loop that drives it.

pub mod api;
pub mod client;
pub mod db;
pub mod error;
pub mod settings;
pub mod state;
pub mod stream;
pub mod tools;
pub mod types;

pub use client::{ChatClient, ChatStream};
pub use error::{ApiError, ChatError};
pub use settings::{AppSettings, DeviceId};
pub use state::AppState;
pub use stream::{ResponseAssembler, StreamDecoder, StreamEvent};
pub use types::{AssistantResponse, ChartSpec, ChartType};
