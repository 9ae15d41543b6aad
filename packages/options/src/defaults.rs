//! Process-wide collaborator defaults
//!
//! `Options::new` fills `socket_factory`, `ssl_socket_factory`, `cache` and
//! `timeout_strategy` from the global [`Defaults`] when the caller leaves them
//! out. The global starts as [`Defaults::default`] on first use and can be
//! replaced at any time; records already built keep the collaborators they
//! were built with. Tests and embedders that need different defaults should
//! prefer `Options::from_map_with` over mutating the global.

use std::sync::{Arc, LazyLock, PoisonError, RwLock};

use crate::cache::{Cache, NullCache};
use crate::connect::{RustlsSocketFactory, SocketFactory, TcpSocketFactory, TlsSocketFactory};
use crate::timeout::{NullTimeout, TimeoutStrategy};
use crate::value::{JsonMap, OptionMap, OptionValue};

/// Response shaping when none is requested.
pub const DEFAULT_RESPONSE: &str = "auto";

/// Idle keep-alive window, in seconds.
pub const DEFAULT_KEEP_ALIVE_TIMEOUT: u64 = 5;

static GLOBAL_DEFAULTS: LazyLock<RwLock<Defaults>> =
    LazyLock::new(|| RwLock::new(Defaults::default()));

/// Collaborators used for options the caller did not set.
#[derive(Debug, Clone)]
pub struct Defaults {
    pub socket_factory: Arc<dyn SocketFactory>,
    pub ssl_socket_factory: Arc<dyn TlsSocketFactory>,
    pub cache: Arc<dyn Cache>,
    pub timeout_strategy: Arc<dyn TimeoutStrategy>,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            socket_factory: Arc::new(TcpSocketFactory),
            ssl_socket_factory: Arc::new(RustlsSocketFactory),
            cache: Arc::new(NullCache),
            timeout_strategy: Arc::new(NullTimeout),
        }
    }
}

impl Defaults {
    /// Snapshot of the process-wide defaults.
    pub fn global() -> Defaults {
        GLOBAL_DEFAULTS
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replaces the process-wide defaults, returning the previous ones.
    pub fn set_global(defaults: Defaults) -> Defaults {
        let mut guard = GLOBAL_DEFAULTS
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let previous = std::mem::replace(&mut *guard, defaults);
        guard.log_replaced();
        previous
    }

    /// Edits the process-wide defaults in place, holding the write lock for
    /// the duration of `update`.
    pub fn update_global(update: impl FnOnce(&mut Defaults)) {
        let mut guard = GLOBAL_DEFAULTS
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        update(&mut *guard);
        guard.log_replaced();
    }

    fn log_replaced(&self) {
        tracing::debug!(
            target: "quyc::options",
            socket_factory = self.socket_factory.name(),
            ssl_socket_factory = self.ssl_socket_factory.name(),
            cache = self.cache.name(),
            timeout_strategy = self.timeout_strategy.name(),
            "Process-wide option defaults replaced"
        );
    }

    #[must_use]
    pub fn with_socket_factory(mut self, factory: Arc<dyn SocketFactory>) -> Self {
        self.socket_factory = factory;
        self
    }

    #[must_use]
    pub fn with_ssl_socket_factory(mut self, factory: Arc<dyn TlsSocketFactory>) -> Self {
        self.ssl_socket_factory = factory;
        self
    }

    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn Cache>) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub fn with_timeout_strategy(mut self, strategy: Arc<dyn TimeoutStrategy>) -> Self {
        self.timeout_strategy = strategy;
        self
    }

    /// Declared default value of every defaulted option.
    pub(crate) fn to_option_map(&self) -> OptionMap {
        OptionMap::new()
            .with("response", DEFAULT_RESPONSE)
            .with("proxy", JsonMap::new())
            .with("timeout_strategy", OptionValue::TimeoutStrategy(Arc::clone(&self.timeout_strategy)))
            .with("timeout_options", JsonMap::new())
            .with("socket_factory", OptionValue::SocketFactory(Arc::clone(&self.socket_factory)))
            .with(
                "ssl_socket_factory",
                OptionValue::TlsSocketFactory(Arc::clone(&self.ssl_socket_factory)),
            )
            .with("ssl", JsonMap::new())
            .with("cache", OptionValue::Cache(Arc::clone(&self.cache)))
            .with("keep_alive_timeout", DEFAULT_KEEP_ALIVE_TIMEOUT)
            .with("headers", JsonMap::new())
    }
}
