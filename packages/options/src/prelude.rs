//! Quyc Options Prelude
//!
//! The types needed to build, update and inspect an options record.

// The record and its inputs
pub use crate::options::{IntoOptions, Options, ResponseMode};
pub use crate::value::{JsonMap, OptionMap, OptionValue};

// Error types
pub use crate::error::{Error, Kind, Result};

// Collaborator capabilities and their stock implementations
pub use crate::cache::{Cache, CacheConfig, HttpCache, NullCache};
pub use crate::connect::{
    RustlsSocketFactory, Socket, SocketFactory, TcpSocketFactory, TlsSocketFactory,
};
pub use crate::defaults::Defaults;
pub use crate::follow::{FollowOptions, FollowPolicy};
pub use crate::timeout::{
    GlobalTimeout, NullTimeout, PerOperationTimeout, TimeoutStrategy, Timeouts,
};
pub use crate::uri::Origin;

// HTTP standard types from http crate
pub use ::http::{HeaderMap, HeaderName, HeaderValue};
