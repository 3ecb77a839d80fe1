// src/types/mod.rs

pub mod chart;
pub mod chat;
pub mod openai;

pub use chart::*;
pub use chat::*;
pub use openai::*;
