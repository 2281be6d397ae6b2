//! Wire framing for the three packet kinds: DATA, ACK, EOT.
//!
//! All multi-byte fields use the host's native byte order; this protocol is
//! not portable across heterogeneous endianness, which is an accepted
//! limitation (see the spec's Design Notes).

use std::fmt;

use super::seq::SeqNo;

pub const SENTINEL: u8 = 0x7f;

const FLAG_DATA: u8 = 0x1;
const FLAG_ACK: u8 = 0x2;
const FLAG_EOT: u8 = 0x4;

const FIXED_HEADER_SIZE: usize = 4 + 1 + 1 + 1 + 1;
const PAYLOAD_HEADER_SIZE: usize = 4 + 4;

/// Largest UDP payload this protocol will ever send.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

pub const fn size_of_eot() -> usize {
    FIXED_HEADER_SIZE
}

pub const fn size_of_ack() -> usize {
    FIXED_HEADER_SIZE
}

/// `name_size` includes the trailing NUL.
pub const fn size_of_data(name_size: usize, data_size: usize) -> usize {
    FIXED_HEADER_SIZE + PAYLOAD_HEADER_SIZE + name_size + data_size
}

fn write_fixed_header(buf: &mut Vec<u8>, total_size: usize, seq_n: u8, ack_seq_n: u8, flags: u8) {
    buf.extend_from_slice(&(total_size as i32).to_ne_bytes());
    buf.push(seq_n);
    buf.push(ack_seq_n);
    buf.push(flags);
    buf.push(SENTINEL);
}

pub fn encode_eot() -> Vec<u8> {
    let mut buf = Vec::with_capacity(size_of_eot());
    write_fixed_header(&mut buf, size_of_eot(), 0, 0, FLAG_EOT);
    buf
}

pub fn encode_ack(ack_seq_n: SeqNo) -> Vec<u8> {
    let mut buf = Vec::with_capacity(size_of_ack());
    write_fixed_header(&mut buf, size_of_ack(), 0, ack_seq_n.value(), FLAG_ACK);
    buf
}

/// `name` must not itself contain a NUL byte; the trailing NUL is added here.
pub fn encode_data(req_n: i32, seq_n: SeqNo, name: &[u8], data: &[u8]) -> Vec<u8> {
    let name_size = name.len() + 1;
    let total = size_of_data(name_size, data.len());

    let mut buf = Vec::with_capacity(total);
    write_fixed_header(&mut buf, total, seq_n.value(), 0, FLAG_DATA);
    buf.extend_from_slice(&req_n.to_ne_bytes());
    buf.extend_from_slice(&(name_size as i32).to_ne_bytes());
    buf.extend_from_slice(name);
    buf.push(0);
    buf.extend_from_slice(data);
    buf
}

/// Result of validating a datagram's fixed header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classified {
    Invalid,
    Data { seq_n: SeqNo },
    Ack { ack_seq_n: SeqNo },
    Eot,
}

/// Validate the fixed header (invariants 1-3 of the spec) and classify the
/// packet kind. The flag byte must carry exactly one of the three valid
/// bits; this is a strengthening over a looser "any of these bits" test,
/// and cannot reject anything a correctly-encoded packet would set.
pub fn classify(datagram: &[u8]) -> Classified {
    if datagram.len() < FIXED_HEADER_SIZE {
        return Classified::Invalid;
    }

    let size = i32::from_ne_bytes([datagram[0], datagram[1], datagram[2], datagram[3]]);
    let seq_n = datagram[4];
    let ack_seq_n = datagram[5];
    let flags = datagram[6];
    let sentinel = datagram[7];

    if sentinel != SENTINEL {
        return Classified::Invalid;
    }
    if size < 0 || size as usize != datagram.len() {
        return Classified::Invalid;
    }

    match flags {
        FLAG_DATA => Classified::Data {
            seq_n: SeqNo::new(seq_n),
        },
        FLAG_ACK => Classified::Ack {
            ack_seq_n: SeqNo::new(ack_seq_n),
        },
        FLAG_EOT => Classified::Eot,
        _ => Classified::Invalid,
    }
}

/// A decoded DATA payload, borrowing from the datagram it was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataPayload<'a> {
    pub req_n: i32,
    pub file_name: &'a [u8],
    pub data: &'a [u8],
}

impl<'a> DataPayload<'a> {
    pub fn file_name_lossy(&self) -> std::borrow::Cow<'a, str> {
        String::from_utf8_lossy(self.file_name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadError {
    TooShortForHeader,
    NonPositiveNameSize,
    NameExceedsDatagram,
    NameNotNulTerminated,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            PayloadError::TooShortForHeader => "datagram too short for a DATA payload header",
            PayloadError::NonPositiveNameSize => "file name size is not positive",
            PayloadError::NameExceedsDatagram => "file name does not fit inside the datagram",
            PayloadError::NameNotNulTerminated => "file name is not NUL-terminated",
        };
        f.write_str(msg)
    }
}

/// Decode the DATA payload sub-header, name, and bytes out of a datagram
/// already classified as `Classified::Data`. Separate from `classify`
/// because the receiver must still advance and ACK even when this fails
/// (invariant 4 failing on an otherwise-valid header is not itself
/// session-fatal).
pub fn decode_data(datagram: &[u8]) -> Result<DataPayload<'_>, PayloadError> {
    if datagram.len() < FIXED_HEADER_SIZE + PAYLOAD_HEADER_SIZE {
        return Err(PayloadError::TooShortForHeader);
    }

    let req_n = i32::from_ne_bytes([
        datagram[8],
        datagram[9],
        datagram[10],
        datagram[11],
    ]);
    let name_size = i32::from_ne_bytes([
        datagram[12],
        datagram[13],
        datagram[14],
        datagram[15],
    ]);

    if name_size <= 0 {
        return Err(PayloadError::NonPositiveNameSize);
    }
    let name_size = name_size as usize;

    let name_start = FIXED_HEADER_SIZE + PAYLOAD_HEADER_SIZE;
    let name_end = name_start + name_size;
    if datagram.len() < name_end {
        return Err(PayloadError::NameExceedsDatagram);
    }
    if datagram[name_end - 1] != 0 {
        return Err(PayloadError::NameNotNulTerminated);
    }

    Ok(DataPayload {
        req_n,
        file_name: &datagram[name_start..name_end - 1],
        data: &datagram[name_end..],
    })
}
