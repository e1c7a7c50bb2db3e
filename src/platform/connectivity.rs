use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

pub trait Connectivity {
    fn is_connected(&self) -> bool;
}

/// Reachability check: a TCP connect to the API host.
pub struct TcpProbe {
    authority: Option<String>,
    timeout: Duration,
}

impl TcpProbe {
    pub fn for_url(url: &str, timeout: Duration) -> Self {
        Self {
            authority: authority_of(url),
            timeout,
        }
    }
}

impl Connectivity for TcpProbe {
    fn is_connected(&self) -> bool {
        let Some(authority) = &self.authority else {
            return false;
        };
        let addrs = match authority.to_socket_addrs() {
            Ok(a) => a,
            Err(e) => {
                tracing::debug!(%authority, error = %e, "cannot resolve API host");
                return false;
            }
        };
        for addr in addrs {
            if TcpStream::connect_timeout(&addr, self.timeout).is_ok() {
                return true;
            }
        }
        false
    }
}

/// `host:port` part of an http(s) URL, with the scheme's default port
/// filled in.
pub fn authority_of(url: &str) -> Option<String> {
    let (default_port, rest) = if let Some(r) = url.strip_prefix("https://") {
        (443, r)
    } else if let Some(r) = url.strip_prefix("http://") {
        (80, r)
    } else {
        return None;
    };

    let host_port = rest.split(['/', '?', '#']).next()?;
    let host_port = host_port.rsplit('@').next()?;
    if host_port.is_empty() {
        return None;
    }

    let has_port = match host_port.rfind(':') {
        Some(i) => !host_port[i..].contains(']'),
        None => false,
    };
    if has_port {
        Some(host_port.to_string())
    } else {
        Some(format!("{host_port}:{default_port}"))
    }
}
