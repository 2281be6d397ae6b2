//! The two session state machines: the sender's sliding-window producer and
//! the receiver's in-order delivery filter.

pub mod receiver;
pub mod sender;
