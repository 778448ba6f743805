//! Typed client for in-flight Wi-Fi portal services
//!
//! Every response is decoded as JSON and checked against a JSON Schema
//! before it is handed back. The schemas are deliberately forgiving:
//! declared fields may be missing and unknown fields are kept.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod models;
pub mod parser;
pub mod schema;

pub use client::PortalClient;
pub use config::Config;
pub use error::{Error, Result, ShapeMismatch};
pub use http::{ReqwestTransport, Transport, TransportRequest, TransportResponse};
