//! A reliable file-transfer protocol over UDP: a sender walks a list of
//! local files and transmits each as a DATA packet under a sliding-window,
//! cumulative-ACK protocol; a receiver delivers them in order and searches
//! a local directory for a byte-identical match, recording the outcome in
//! an append-only log.

mod err;
pub mod fileio;
pub mod net;
pub mod session;
pub mod wire;

pub use err::Error;
