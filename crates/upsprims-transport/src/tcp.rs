use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use tracing::debug;

use crate::endpoint::Endpoint;
use crate::error::{Result, TransportError};
use crate::traits::UpsStream;

/// Open a fresh connection session to `endpoint` (blocking).
///
/// Every resolved address is tried in order with `timeout` as the connect
/// bound; read and write timeouts on the returned stream are set to the
/// same value.
pub fn connect(endpoint: &Endpoint, timeout: Duration) -> Result<UpsStream> {
    let addrs = resolve(endpoint)?;

    let mut last_err = None;
    for addr in addrs {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                stream.set_read_timeout(Some(timeout))?;
                stream.set_write_timeout(Some(timeout))?;
                let _ = stream.set_nodelay(true);
                debug!(%endpoint, %addr, "connected to ups adapter");
                return Ok(UpsStream::from_tcp(stream));
            }
            Err(err) => {
                debug!(%endpoint, %addr, error = %err, "connect attempt failed");
                last_err = Some(err);
            }
        }
    }

    Err(TransportError::Connect {
        endpoint: endpoint.to_string(),
        source: last_err.unwrap_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "no address to connect to")
        }),
    })
}

/// Check whether the adapter accepts TCP connections, without speaking the
/// UPS protocol. Distinguishes "adapter unreachable" from "UPS silent".
pub fn probe(endpoint: &Endpoint, timeout: Duration) -> bool {
    match connect(endpoint, timeout) {
        Ok(stream) => {
            stream.close();
            true
        }
        Err(err) => {
            debug!(%endpoint, error = %err, "adapter probe failed");
            false
        }
    }
}

fn resolve(endpoint: &Endpoint) -> Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = (endpoint.host(), endpoint.port())
        .to_socket_addrs()
        .map_err(|e| TransportError::Resolve {
            endpoint: endpoint.to_string(),
            source: e,
        })?
        .collect();

    if addrs.is_empty() {
        return Err(TransportError::Resolve {
            endpoint: endpoint.to_string(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "host resolved to no addresses",
            ),
        });
    }
    Ok(addrs)
}
