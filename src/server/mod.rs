//! Operator command interface
//!
//! Accepts TCP connections on the command port and spawns one session task
//! per client. Every session gets its own subscription to the PC frame
//! fan-out and a child of the shutdown token.

pub mod session;

use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::protocol::EmsMessage;
use crate::runtime::dispatcher::Dispatcher;

/// Accept command clients until shutdown
pub async fn run(
    listener: TcpListener,
    dispatcher: Dispatcher,
    pc_frames: broadcast::Sender<EmsMessage>,
    shutdown: CancellationToken,
) {
    if let Ok(addr) = listener.local_addr() {
        info!("command interface listening on {}", addr);
    }

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer)) => {
                    info!(%peer, "command client connected");
                    tokio::spawn(session::run(
                        stream,
                        peer.to_string(),
                        dispatcher.clone(),
                        pc_frames.subscribe(),
                        shutdown.child_token(),
                    ));
                }
                Err(e) => {
                    warn!("accept failed: {}", e);
                    // Usually fd exhaustion; don't spin on it.
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
            },
        }
    }
}
