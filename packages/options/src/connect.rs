//! Transport constructors
//!
//! `socket_factory` opens plain connections and `ssl_socket_factory` layers
//! TLS over them. Both are capabilities carried by reference in the options
//! record; the record itself never opens a connection.

use std::fmt;
use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use rustls::{ClientConfig, ClientConnection, RootCertStore, StreamOwned};

/// Byte stream produced by a socket factory.
pub trait Socket: Read + Write + Send + fmt::Debug {}

impl<T: Read + Write + Send + fmt::Debug> Socket for T {}

/// Plain transport capability.
pub trait SocketFactory: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    fn connect(&self, host: &str, port: u16, timeout: Option<Duration>)
    -> io::Result<Box<dyn Socket>>;
}

/// TLS transport capability.
pub trait TlsSocketFactory: fmt::Debug + Send + Sync {
    fn name(&self) -> &str;

    /// Wraps an established socket in a TLS session for `host`, using
    /// `context` when the caller supplied one.
    fn wrap(
        &self,
        socket: Box<dyn Socket>,
        host: &str,
        context: Option<&Arc<ClientConfig>>,
    ) -> io::Result<Box<dyn Socket>>;
}

/// `std::net::TcpStream` connections with `TCP_NODELAY`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpSocketFactory;

impl SocketFactory for TcpSocketFactory {
    fn name(&self) -> &str {
        "tcp"
    }

    fn connect(
        &self,
        host: &str,
        port: u16,
        timeout: Option<Duration>,
    ) -> io::Result<Box<dyn Socket>> {
        let mut last_error = None;

        for addr in (host, port).to_socket_addrs()? {
            let attempt = match timeout {
                Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
                None => TcpStream::connect(addr),
            };
            match attempt {
                Ok(stream) => {
                    stream.set_nodelay(true)?;
                    return Ok(Box::new(stream));
                }
                Err(e) => last_error = Some(e),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("{host}:{port} resolved to no addresses"),
            )
        }))
    }
}

/// rustls client sessions trusting the webpki root set.
#[derive(Debug, Clone, Copy, Default)]
pub struct RustlsSocketFactory;

impl TlsSocketFactory for RustlsSocketFactory {
    fn name(&self) -> &str {
        "rustls"
    }

    fn wrap(
        &self,
        socket: Box<dyn Socket>,
        host: &str,
        context: Option<&Arc<ClientConfig>>,
    ) -> io::Result<Box<dyn Socket>> {
        let config = match context {
            Some(config) => Arc::clone(config),
            None => default_client_config().map_err(io::Error::other)?,
        };
        let server_name = ServerName::try_from(host.to_owned())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let connection = ClientConnection::new(config, server_name).map_err(io::Error::other)?;

        Ok(Box::new(StreamOwned::new(connection, socket)))
    }
}

/// Client configuration with the ring provider and webpki roots.
pub fn default_client_config() -> Result<Arc<ClientConfig>, rustls::Error> {
    let roots = RootCertStore::from_iter(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let config = ClientConfig::builder_with_provider(Arc::new(
        rustls::crypto::ring::default_provider(),
    ))
    .with_safe_default_protocol_versions()?
    .with_root_certificates(roots)
    .with_no_client_auth();

    Ok(Arc::new(config))
}
