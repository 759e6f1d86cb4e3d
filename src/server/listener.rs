// Listener module
// Creates the TCP listener with address reuse and a configurable backlog

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::TcpListener;

/// Create a `TcpListener` with `SO_REUSEADDR` (and `SO_REUSEPORT` on Unix).
///
/// # Arguments
///
/// * `addr` - The socket address to bind to
/// * `backlog` - Pending connection queue size passed to `listen`
pub fn create_reusable_listener(
    addr: std::net::SocketAddr,
    backlog: i32,
) -> std::io::Result<TcpListener> {
    let domain = if addr.is_ipv4() {
        Domain::IPV4
    } else {
        Domain::IPV6
    };

    let socket = Socket::new(domain, Type::STREAM, Some(Protocol::TCP))?;

    // Rebinding right after a restart must not fail on TIME_WAIT sockets
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;

    socket.set_nonblocking(true)?;
    socket.bind(&addr.into())?;
    socket.listen(backlog)?;

    let std_listener: std::net::TcpListener = socket.into();
    TcpListener::from_std(std_listener)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_binds_ephemeral_port() {
        let addr = "127.0.0.1:0".parse().unwrap();
        let listener = create_reusable_listener(addr, 16).unwrap();
        let local = listener.local_addr().unwrap();
        assert!(local.ip().is_loopback());
        assert_ne!(local.port(), 0);
    }
}
