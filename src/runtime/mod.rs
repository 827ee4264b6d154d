//! Runtime orchestration
//!
//! Wires the long-lived tasks together: link supervisor, pacing dispatcher
//! and the command server, all hanging off one shutdown token.

pub mod dispatcher;

use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::BridgeConfig;
use crate::utils::Result;
use crate::{server, transport};

/// Capacity of the PC frame fan-out; a slow session lags rather than
/// stalling the link
const FANOUT_CAPACITY: usize = 64;

/// Bring the bridge up and run it until ctrl-c
pub async fn run(config: BridgeConfig) -> Result<()> {
    let shutdown = CancellationToken::new();
    let times = dispatcher::new_comm_times();
    let (link_tx, link_rx) = mpsc::channel(32);
    let (pc_frames, _) = broadcast::channel(FANOUT_CAPACITY);

    let (dispatch, dispatcher_task) = dispatcher::spawn(link_tx, times.clone(), shutdown.clone());

    let link_task = tokio::spawn(transport::supervisor::run(
        config.bus.clone(),
        link_rx,
        pc_frames.clone(),
        times,
        shutdown.clone(),
    ));

    let server_task = if config.command_port != 0 {
        let listener = TcpListener::bind(("0.0.0.0", config.command_port)).await?;
        Some(tokio::spawn(server::run(
            listener,
            dispatch.clone(),
            pc_frames.clone(),
            shutdown.clone(),
        )))
    } else {
        info!("command interface disabled");
        None
    };

    tokio::signal::ctrl_c().await?;
    info!("shutdown signal received");
    shutdown.cancel();

    let _ = dispatcher_task.await;
    let _ = link_task.await;
    if let Some(task) = server_task {
        let _ = task.await;
    }
    info!("bridge stopped");
    Ok(())
}
