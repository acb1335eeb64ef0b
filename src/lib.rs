//! Resilience and backpressure layer for remote-procedure tool servers.
//!
//! Tool handlers that front a third-party REST API all share the same three
//! hard problems; this crate solves them once:
//!
//! - [`batch`]: a bounded-concurrency scheduler that launches work items in
//!   strict ascending order, retries failures per item, and always returns
//!   an index-ordered partial result instead of raising
//! - [`transport`]: an HTTP client that absorbs 429 rate limiting and
//!   502/503/504 gateway errors with capped retries, surfacing every final
//!   response as a plain envelope
//! - [`budget`]: a deterministic shrinking pass that trims oversized
//!   response payloads to a character budget rather than failing them
//!
//! Wiring lives in [`settings`] and [`context`]; no component reads global
//! state.
//!
//! # Example
//!
//! ```no_run
//! use seawall::batch::{work_fn, BatchOptions, BatchScheduler};
//! use seawall::transport::{RequestSpec, TransportClient, TransportConfig};
//!
//! # #[tokio::main]
//! # async fn main() -> seawall::Result<()> {
//! let client = TransportClient::new(TransportConfig::new("https://api.example.com/v3"))?;
//!
//! let items = (1..=3i64)
//!     .map(|page| {
//!         let client = client.clone();
//!         work_fn(move || {
//!             let client = client.clone();
//!             async move {
//!                 let spec = RequestSpec::get("/tasks.json").with_query("page", page);
//!                 let envelope = client.request_checked(&spec).await?;
//!                 Ok(envelope.body)
//!             }
//!         })
//!     })
//!     .collect();
//!
//! let options = BatchOptions::default().with_concurrency(2).with_retry_limit(1);
//! let result = BatchScheduler::new(options).run(items).await;
//! println!("{}/{} pages fetched", result.successful().len(), result.total());
//! # Ok(())
//! # }
//! ```

pub mod batch;
pub mod budget;
pub mod context;
pub mod error;
pub mod settings;
pub mod telemetry;
pub mod transport;

pub use context::RuntimeContext;
pub use error::{BoxError, Error, ErrorCategory, Result};
pub use settings::Settings;
