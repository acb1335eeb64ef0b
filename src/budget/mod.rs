//! Response-size budget enforcement.
//!
//! # Overview
//!
//! - Measures a payload by the character length of its canonical JSON form
//! - Halves the longest selector-nominated string field until the payload
//!   fits the budget, earliest candidate winning ties
//! - Flags shrunk payloads with `truncated = true` and appends a trim
//!   notice to `guidance`, never replacing guidance already present
//! - Degrades instead of failing: an over-budget payload with no
//!   candidates left is returned as small as it could be made
//!
//! # Example
//!
//! ```ignore
//! use seawall::budget::{enforce, ListFields};
//!
//! let selector = ListFields::new("items", ["snippet"]);
//! let shrunk = enforce(&mut payload, 25_000, &selector);
//! if shrunk {
//!     // payload now carries truncated/guidance markers
//! }
//! ```

mod enforcer;
mod selector;

pub use enforcer::{enforce, GUIDANCE_FIELD, TRUNCATED_FIELD};
pub use selector::{FieldPath, ListFields, PathSegment, ShrinkSelector, TopLevelFields};
