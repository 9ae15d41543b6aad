use std::error::Error as StdError;
use std::fmt;

/// A Result alias where the Err case is `quyc_options::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents errors raised while building or updating an options record.
///
/// Every failure is synchronous and leaves the receiver untouched: a failed
/// `Options::new` or `with_*` call yields no record at all.
pub struct Error {
    pub inner: Box<Inner>,
}

pub struct Inner {
    pub kind: Kind,
    pub source: Option<Box<dyn StdError + Send + Sync>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Kind {
    /// A name that is not in the option registry was written.
    UnknownOption(String),
    /// A registered option rejected the shape of its raw value.
    Configuration,
    /// Header coercion rejected a name or value.
    InvalidHeader,
    /// The URI collaborator could not parse a persistent origin.
    InvalidUri,
}

impl Error {
    pub fn new(kind: Kind) -> Error {
        Error {
            inner: Box::new(Inner { kind, source: None }),
        }
    }

    #[must_use = "Error builder methods return a new Error and should be used"]
    pub fn with<E: Into<Box<dyn StdError + Send + Sync>>>(mut self, source: E) -> Error {
        self.inner.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> &Kind {
        &self.inner.kind
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut f = f.debug_struct("quyc_options::Error");

        f.field("kind", &self.inner.kind);

        if let Some(ref source) = self.inner.source {
            f.field("source", source);
        }

        f.finish()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.kind {
            Kind::UnknownOption(name) => write!(f, "unknown option: {name}")?,
            Kind::Configuration => f.write_str("configuration error")?,
            Kind::InvalidHeader => f.write_str("invalid header")?,
            Kind::InvalidUri => f.write_str("invalid uri")?,
        }

        if let Some(ref source) = self.inner.source {
            write!(f, ": {source}")?;
        }

        Ok(())
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.inner
            .source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

impl Error {
    /// Returns true if a write named an option outside the registry.
    pub fn is_unknown_option(&self) -> bool {
        matches!(self.inner.kind, Kind::UnknownOption(_))
    }

    /// Returns true if an option rejected its value.
    pub fn is_configuration(&self) -> bool {
        matches!(self.inner.kind, Kind::Configuration)
    }

    pub fn is_invalid_header(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidHeader)
    }

    pub fn is_invalid_uri(&self) -> bool {
        matches!(self.inner.kind, Kind::InvalidUri)
    }
}
