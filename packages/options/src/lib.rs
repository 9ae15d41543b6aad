//! # Quyc Options
//!
//! Copy-on-write configuration record for the quyc HTTP client: timeouts,
//! proxy, cache strategy, headers, redirect policy, persistence and socket
//! implementations, each declared once in a static registry and validated
//! as it is written.
//!
//! ## Features
//!
//! - **Registry-driven options** with per-option coercion on every write
//! - **Copy-on-write updates**: `with_*` returns a new record, never mutates
//! - **Structural merge** with header union and right-biased fields
//! - **Pluggable collaborators**: caches, socket factories and timeout
//!   strategies as `Arc<dyn ...>` capabilities
//! - **Process-wide defaults** that can be overridden or bypassed per call
//!
//! ## Usage
//!
//! ```
//! use quyc_options::{OptionMap, Options};
//! use serde_json::json;
//!
//! let options = Options::new(
//!     OptionMap::new()
//!         .with("headers", json!({"Accept": "application/json"}))
//!         .with("follow", true),
//! )?;
//!
//! let persistent = options.with_persistent("https://api.example.com:8443/v1")?;
//! assert!(persistent.is_persistent());
//! assert!(!options.is_persistent());
//! # Ok::<(), quyc_options::Error>(())
//! ```

pub mod cache;
pub mod connect;
pub mod defaults;
pub mod error;
pub mod follow;
pub mod headers;
pub mod options;
pub mod registry;
pub mod timeout;
pub mod uri;
pub mod value;

pub mod prelude;

pub use crate::prelude::*;
