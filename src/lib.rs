//! Terminal client for chat-driven model editing: configuration, the
//! `reqwest` backend gateway and the line-oriented chat loop.

pub mod config;
pub mod errors;
pub mod http;
pub mod render;
pub mod repl;

pub use config::ClientConfig;
pub use http::HttpGateway;
