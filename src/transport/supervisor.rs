//! Bus link supervision
//!
//! Owns the transport for its whole life: pumps outbound frames from the
//! dispatcher, decodes inbound telegrams, stamps per-peer communication
//! times, fans PC-directed frames out to the command sessions, and rebuilds
//! the link with exponential backoff when it dies. The bus chatters
//! periodically on its own, so a receive watchdog catches silently dead
//! tunnels.

use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::time::{timeout, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::link::{self, BusLink};
use crate::config::BusTarget;
use crate::protocol::constants::{ADDR_PC, LINK_WATCHDOG};
use crate::protocol::EmsMessage;
use crate::runtime::dispatcher::CommTimes;
use crate::utils::{BridgeError, Result};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Run the link until shutdown; reconnects forever on transport failure
pub async fn run(
    target: BusTarget,
    mut outbound: mpsc::Receiver<EmsMessage>,
    pc_frames: broadcast::Sender<EmsMessage>,
    times: CommTimes,
    cancel: CancellationToken,
) {
    let mut backoff = INITIAL_BACKOFF;

    while !cancel.is_cancelled() {
        let mut link = match link::connect(&target).await {
            Ok(link) => {
                info!("bus link established");
                backoff = INITIAL_BACKOFF;
                link
            }
            Err(e) => {
                warn!("bus link connect failed: {}, retrying in {:?}", e, backoff);
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(backoff) => {}
                }
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        match pump(link.as_mut(), &mut outbound, &pc_frames, &times, &cancel).await {
            Ok(()) => return,
            Err(e) => {
                warn!("bus link lost: {}", e);
                tokio::select! {
                    _ = cancel.cancelled() => return,
                    _ = tokio::time::sleep(INITIAL_BACKOFF) => {}
                }
            }
        }
    }
}

/// I/O loop on an established link; `Ok` means orderly shutdown
async fn pump(
    link: &mut dyn BusLink,
    outbound: &mut mpsc::Receiver<EmsMessage>,
    pc_frames: &broadcast::Sender<EmsMessage>,
    times: &CommTimes,
    cancel: &CancellationToken,
) -> Result<()> {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => return Ok(()),
            message = outbound.recv() => match message {
                Some(message) => link.send(&message).await?,
                None => return Ok(()),
            },
            received = timeout(LINK_WATCHDOG, link.recv()) => {
                let message = received
                    .map_err(|_| BridgeError::link("receive watchdog expired"))??;
                handle_inbound(message, pc_frames, times);
            }
        }
    }
}

fn handle_inbound(message: EmsMessage, pc_frames: &broadcast::Sender<EmsMessage>, times: &CommTimes) {
    if let Ok(mut t) = times.lock() {
        t.insert(message.source, Instant::now());
    }
    if message.destination == ADDR_PC {
        debug!(
            "bus frame for the bridge: source {:#04x}, type {:#04x}",
            message.source, message.msg_type
        );
        // Fan out to every command session; no session listening is fine.
        let _ = pc_frames.send(message);
    }
}
