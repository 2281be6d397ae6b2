//! UDP socket setup, host resolution, and the probabilistic-drop send shim.

use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::trace;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::err::Error;

/// Resolve `host:port` to a single socket address, the way the original
/// used `gethostbyname`.
pub fn resolve_host(host: &str, port: u16) -> Result<SocketAddr, Error> {
    (host, port)
        .to_socket_addrs()
        .map_err(|source| Error::HostResolution {
            host: host.to_string(),
            source,
        })?
        .next()
        .ok_or_else(|| Error::HostNotFound(host.to_string()))
}

/// The narrow slice of socket behavior the session state machines in
/// [`crate::session`] depend on. Letting them run against anything that
/// implements this trait, rather than [`LossySocket`] directly, is what lets
/// the integration tests drive both halves of a session over an in-memory
/// channel instead of real loopback sockets.
pub trait Transport {
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> std::io::Result<usize>;
    fn recv_from(&mut self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)>;
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()>;
}

/// A UDP socket wrapped with a probabilistic outbound-drop shim. Every
/// `send_to` call, regardless of packet kind (DATA, ACK, or EOT alike), is
/// independently dropped with probability `drop_probability`. Receiving is
/// never lossy at this layer.
pub struct LossySocket {
    socket: UdpSocket,
    drop_probability: f64,
    rng: StdRng,
}

impl LossySocket {
    /// Binds a UDP socket to `local_port` (0 for an ephemeral port).
    pub fn bind(local_port: u16, drop_probability: f64) -> Result<Self, Error> {
        let socket = UdpSocket::bind(("0.0.0.0", local_port))?;
        // Stands in for `srand48_from_time`: reseed from the clock at
        // process start rather than hard-coding a fixed seed.
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos() as u64
            ^ (local_port as u64);
        Ok(LossySocket {
            socket,
            drop_probability: drop_probability.clamp(0.0, 1.0),
            rng: StdRng::seed_from_u64(seed),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.socket.local_addr()
    }
}

impl Transport for LossySocket {
    fn set_read_timeout(&mut self, timeout: Option<Duration>) -> std::io::Result<()> {
        self.socket.set_read_timeout(timeout)
    }

    fn recv_from(&mut self, buf: &mut [u8]) -> std::io::Result<(usize, SocketAddr)> {
        self.socket.recv_from(buf)
    }

    /// Sends `buf` to `target`, except that it is silently discarded with
    /// probability `drop_probability`. A drop still reports `Ok` with the
    /// full length, mirroring a successful `sendto` whose datagram never
    /// arrives.
    fn send_to(&mut self, buf: &[u8], target: SocketAddr) -> std::io::Result<usize> {
        if self.drop_probability > 0.0 && self.rng.gen::<f64>() < self.drop_probability {
            trace!("dropping outbound datagram ({} bytes) to {target}", buf.len());
            return Ok(buf.len());
        }
        self.socket.send_to(buf, target)
    }
}
