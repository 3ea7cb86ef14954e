//! Minimal async client for OpenAI-compatible chat and image endpoints

mod client;

pub use client::*;
