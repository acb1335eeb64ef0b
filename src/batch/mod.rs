//! Bounded-concurrency batch runner.
//!
//! # Overview
//!
//! - Launches work items in strict ascending index order, never more than
//!   the configured cap in flight at once
//! - Retries failed attempts with constant or exponential delays; a
//!   retrying item keeps occupying its slot
//! - Surfaces lifecycle events over an optional channel and honors an
//!   optional cancellation signal
//! - Always returns an aggregate result: per-item failures never escape as
//!   errors
//!
//! # Example
//!
//! ```ignore
//! use seawall::batch::{work_fn, BatchOptions, BatchScheduler};
//!
//! let items = (0..20)
//!     .map(|n| work_fn(move || async move { fetch_page(n).await }))
//!     .collect();
//! let options = BatchOptions::default().with_concurrency(4).with_retry_limit(2);
//! let result = BatchScheduler::new(options).run(items).await;
//! println!("{}/{} succeeded", result.successful().len(), result.total());
//! ```

mod events;
mod options;
mod result;
mod scheduler;
mod work;

pub use events::BatchEvent;
pub use options::BatchOptions;
pub use result::{BatchResult, ItemFailure};
pub use scheduler::BatchScheduler;
pub use work::{work_fn, FnWorkItem, WorkItem};
