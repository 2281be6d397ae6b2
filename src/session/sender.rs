//! Sender session: the sliding-window producer (§4.2 of the spec).

use std::collections::VecDeque;
use std::fs;
use std::io;
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::err::Error;
use crate::fileio::FileList;
use crate::net::Transport;
use crate::wire::{self, Classified, SeqNo};

/// Per-head-of-window retransmit timeout, `T`.
pub const ACK_TIMEOUT: Duration = Duration::from_secs(5);

struct WindowEntry {
    packet: Vec<u8>,
    send_time: Instant,
}

/// Builds a DATA packet from a file-list entry. Returns `None` (having
/// already logged why) if the file cannot be packetized; per the spec this
/// is a per-file skip, not a fatal error, and consumes neither a `seq_n`
/// nor a `req_n`.
fn build_data_packet(path_str: &str, req_n: i32, seq_n: SeqNo) -> Option<Vec<u8>> {
    let path = Path::new(path_str);
    let base_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path_str.to_string());

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(err) => {
            warn!("skipping unreadable file {path_str:?}: {err}");
            return None;
        }
    };

    let name_bytes = base_name.as_bytes();
    let total_size = wire::size_of_data(name_bytes.len() + 1, data.len());
    if total_size > wire::MAX_DATAGRAM_SIZE {
        warn!(
            "skipping {path_str:?}: encoded size {total_size} exceeds the {} byte datagram limit",
            wire::MAX_DATAGRAM_SIZE
        );
        return None;
    }

    Some(wire::encode_data(req_n, seq_n, name_bytes, &data))
}

/// Runs the sender's main control loop (§4.2) to completion: fills the
/// window from `files`, retransmits on timeout, advances on cumulative ACK,
/// and sends one EOT once the file list is drained and the window empty.
///
/// `ack_timeout` is `T` from the spec; the `sender` binary always passes
/// [`ACK_TIMEOUT`], but tests shrink it so a retransmit scenario does not
/// have to wait out the production timeout in real time.
pub fn run<T: Transport>(
    socket: &mut T,
    target: SocketAddr,
    mut files: FileList,
    ack_timeout: Duration,
) -> Result<(), Error> {
    let mut window: VecDeque<WindowEntry> = VecDeque::with_capacity(wire::WINDOW_SIZE);
    let mut window_base = SeqNo::ZERO;
    let mut req_n: i32 = 0;
    let mut current_time = Instant::now();
    let mut exhausted = false;
    let mut recv_buf = vec![0u8; wire::MAX_DATAGRAM_SIZE];

    loop {
        // 1. Fill.
        while window.len() < wire::WINDOW_SIZE && !exhausted {
            let Some(path) = files.next() else {
                exhausted = true;
                break;
            };

            let seq_n = window_base.add(SeqNo::new(window.len() as u8));
            let Some(packet) = build_data_packet(&path, req_n, seq_n) else {
                continue;
            };

            debug!("sending data packet seq_n={} req_n={req_n}", seq_n.value());
            socket.send_to(&packet, target)?;
            window.push_back(WindowEntry {
                packet,
                send_time: current_time,
            });
            req_n += 1;
        }

        // 2. Drain check.
        if exhausted && window.is_empty() {
            break;
        }

        // 3. Wait.
        let head_deadline = window.front().expect("non-empty by construction").send_time + ack_timeout;
        let timeout = head_deadline
            .saturating_duration_since(current_time)
            .max(Duration::from_millis(1));
        socket.set_read_timeout(Some(timeout))?;

        let outcome = socket.recv_from(&mut recv_buf);

        // 4. Refresh clock.
        current_time = Instant::now();

        // 5. Handle outcome.
        match outcome {
            Ok((n, _src)) => match wire::classify(&recv_buf[..n]) {
                Classified::Ack { ack_seq_n } => {
                    let i = ack_seq_n.sub(window_base);
                    if (i.value() as usize) < window.len() {
                        let pop_count = i.value() as usize + 1;
                        for _ in 0..pop_count {
                            window.pop_front();
                        }
                        window_base = window_base.add(SeqNo::new(pop_count as u8));
                        debug!(
                            "ack_seq_n={} advanced window, base now {}, {} outstanding",
                            ack_seq_n.value(),
                            window_base.value(),
                            window.len()
                        );
                    } else {
                        debug!(
                            "ignoring stale/spurious ack_seq_n={}",
                            ack_seq_n.value()
                        );
                    }
                }
                Classified::Invalid => debug!("received an invalid packet"),
                other => debug!("received an unexpected packet: {other:?}"),
            },
            Err(err)
                if err.kind() == io::ErrorKind::WouldBlock
                    || err.kind() == io::ErrorKind::TimedOut =>
            {
                info!(
                    "ack timeout, retransmitting {} outstanding packet(s)",
                    window.len()
                );
                for entry in window.iter_mut() {
                    socket.send_to(&entry.packet, target)?;
                    entry.send_time = current_time;
                }
            }
            Err(err) => return Err(err.into()),
        }
    }

    let eot = wire::encode_eot();
    socket.send_to(&eot, target)?;
    info!("sent EOT, session complete");
    Ok(())
}
