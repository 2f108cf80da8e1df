#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod config;
pub mod error;

mod dialer;
mod endpoint;
mod keepalive;
mod reader;
mod supervisor;
mod types;
mod writer;

pub use config::Config;
pub use endpoint::Endpoint;
pub use error::Error;
/// HTTP header map type accepted at construction, re-exported from the
/// underlying transport.
pub use tokio_tungstenite::tungstenite::http::HeaderMap;
pub use types::{Command, State, Status};

pub type Result<T> = std::result::Result<T, Error>;
