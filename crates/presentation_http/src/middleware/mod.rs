//! Request extractors and layers

mod client_key;
mod json;

pub use client_key::ClientKey;
pub use json::JsonBody;
