//! Receiver session: the in-order delivery filter (§4.3 of the spec).

use log::{debug, info, warn};

use crate::err::Error;
use crate::fileio::SearchHandler;
use crate::net::Transport;
use crate::wire::{self, Classified, SeqNo};

/// Runs the receiver's session loop to completion: classify each datagram,
/// deduplicate and deliver DATA in order, cumulative-ACK, and terminate on
/// EOT.
pub fn run<T: Transport>(socket: &mut T, search: &mut SearchHandler) -> Result<(), Error> {
    let mut last_delivered = SeqNo::new(1).neg();
    let mut buf = vec![0u8; wire::MAX_DATAGRAM_SIZE];

    loop {
        let (n, src) = socket.recv_from(&mut buf)?;

        match wire::classify(&buf[..n]) {
            Classified::Invalid => {
                debug!("received an invalid packet from {src}");
            }
            Classified::Eot => {
                info!("received EOT from {src}, ending session");
                break;
            }
            Classified::Ack { .. } => {
                debug!("received an unexpected ACK packet from {src}");
            }
            Classified::Data { seq_n } => {
                let mut should_ack = false;

                if seq_n == last_delivered {
                    // Duplicate of the last successfully delivered packet,
                    // caused by an ACK loss. Re-ACK without re-delivering.
                    debug!("duplicate of last delivered seq_n={}", seq_n.value());
                    should_ack = true;
                } else if seq_n == last_delivered.add(SeqNo::new(1)) {
                    last_delivered = seq_n;
                    should_ack = true;

                    match wire::decode_data(&buf[..n]) {
                        Ok(payload) => {
                            let remote_name = payload.file_name_lossy();
                            debug!(
                                "delivering seq_n={} req_n={} file={remote_name:?}",
                                seq_n.value(),
                                payload.req_n
                            );
                            search.search(&remote_name, payload.data)?;
                        }
                        Err(err) => {
                            // The outer header validated fine, but the
                            // payload is malformed. Still advance and ACK
                            // so the sender does not stall; skip the search.
                            warn!(
                                "data packet seq_n={} accepted but payload invalid: {err}",
                                seq_n.value()
                            );
                        }
                    }
                } else {
                    debug!(
                        "dropping out-of-window seq_n={} (last delivered {})",
                        seq_n.value(),
                        last_delivered.value()
                    );
                }

                if should_ack {
                    let ack = wire::encode_ack(last_delivered);
                    socket.send_to(&ack, src)?;
                    debug!("sent ack_seq_n={}", last_delivered.value());
                }
            }
        }
    }

    Ok(())
}
