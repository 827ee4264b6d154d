//! Outbound frame dispatcher
//!
//! Single writer toward the bus link. The EMS bus is half-duplex and peers
//! ignore requests that follow other traffic too closely, so consecutive
//! frames to one destination are spaced at least `MIN_REQUEST_GAP` apart,
//! measured from the last communication observed in either direction.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::protocol::constants::MIN_REQUEST_GAP;
use crate::protocol::EmsMessage;
use crate::utils::{BridgeError, Result};

/// Last-communication instant per peer address, shared between the link
/// supervisor (inbound traffic) and the dispatcher (outbound hand-off)
pub type CommTimes = Arc<Mutex<HashMap<u8, Instant>>>;

pub fn new_comm_times() -> CommTimes {
    Arc::new(Mutex::new(HashMap::new()))
}

struct Outbound {
    message: EmsMessage,
    /// Owning session's token; a frame whose session died is dropped
    cancel: CancellationToken,
}

/// Cloneable handle for enqueueing frames
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::Sender<Outbound>,
}

impl Dispatcher {
    pub async fn enqueue(&self, message: EmsMessage, cancel: CancellationToken) -> Result<()> {
        self.tx
            .send(Outbound { message, cancel })
            .await
            .map_err(|_| BridgeError::ChannelError("dispatcher is gone".to_string()))
    }
}

/// Spawn the dispatcher task feeding `link_tx`
pub fn spawn(
    link_tx: mpsc::Sender<EmsMessage>,
    times: CommTimes,
    cancel: CancellationToken,
) -> (Dispatcher, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(32);
    let handle = tokio::spawn(run(rx, link_tx, times, cancel));
    (Dispatcher { tx }, handle)
}

async fn run(
    mut rx: mpsc::Receiver<Outbound>,
    link_tx: mpsc::Sender<EmsMessage>,
    times: CommTimes,
    cancel: CancellationToken,
) {
    loop {
        let outbound = tokio::select! {
            _ = cancel.cancelled() => break,
            outbound = rx.recv() => match outbound {
                Some(outbound) => outbound,
                None => break,
            },
        };

        let destination = outbound.message.destination;
        let earliest = times
            .lock()
            .ok()
            .and_then(|t| t.get(&destination).copied())
            .map(|last| last + MIN_REQUEST_GAP);

        if let Some(earliest) = earliest {
            if earliest > Instant::now() {
                debug!("deferring send to {:#04x} to honor the request gap", destination);
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = outbound.cancel.cancelled() => continue,
                    _ = sleep_until(earliest) => {}
                }
            }
        }

        if outbound.cancel.is_cancelled() {
            debug!("dropping frame of a closed session");
            continue;
        }

        if link_tx.send(outbound.message).await.is_err() {
            break;
        }
        if let Ok(mut t) = times.lock() {
            t.insert(destination, Instant::now());
        }
    }
}
