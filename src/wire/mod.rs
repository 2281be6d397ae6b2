//! The on-the-wire framing shared by the sender and receiver: packet
//! encode/decode/classify and sequence-number arithmetic.

mod packet;
mod seq;

pub use packet::*;
pub use seq::{SeqNo, WINDOW_SIZE};
