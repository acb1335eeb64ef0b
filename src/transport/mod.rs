//! HTTP transport with transparent retry for transient upstream failures.
//!
//! # Overview
//!
//! - **[`RequestSpec`]**: one logical request (method, path, headers, query,
//!   body, timeout), built fresh per call.
//! - **[`ResponseEnvelope`]**: status, headers, body; never an error. The
//!   status alone signals success or failure.
//! - **[`TransportClient`]**: issues a spec against a base URL, absorbing
//!   429 rate limits and 502/503/504 gateway errors behind a bounded retry
//!   policy. `request` always returns the final envelope; `request_checked`
//!   converts a non-2xx final status into an error carrying it.
//!
//! # Example
//!
//! ```ignore
//! use seawall::transport::{RequestSpec, TransportClient, TransportConfig};
//!
//! let client = TransportClient::new(
//!     TransportConfig::new("https://api.example.com/v3")
//!         .with_header("authorization", "Bearer token"),
//! )?;
//! let spec = RequestSpec::get("/tasks.json").with_query("ids[]", vec!["4", "9"]);
//! let envelope = client.request(&spec).await?;
//! if envelope.is_success() {
//!     println!("{}", envelope.body);
//! }
//! ```

mod client;
mod response;
mod retry;
mod spec;

pub use client::{TransportClient, TransportConfig};
pub use response::ResponseEnvelope;
pub use retry::RATE_LIMIT_RESET_HEADER;
pub use spec::{QueryValue, RequestSpec, ARRAY_KEY_SUFFIX};
