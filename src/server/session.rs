//! One command-port connection
//!
//! A session reads newline-delimited commands, answers immediately for
//! parse failures and help, and otherwise drives its request tracker:
//! frames go out through the shared dispatcher, PC-directed bus frames come
//! in over the broadcast fan-out, and a 2-second deadline guards every
//! outstanding request. A session failing or disconnecting affects nobody
//! else; its cancellation token drops any deferred frame it still owns.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::broadcast;
use tokio::time::{sleep_until, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::command::parser::{self, CommandAction, CommandError};
use crate::command::tracker::{RequestTracker, Step};
use crate::protocol::constants::RESPONSE_TIMEOUT;
use crate::protocol::EmsMessage;
use crate::runtime::dispatcher::Dispatcher;
use crate::utils::Result;

struct SessionState<W> {
    writer: W,
    tracker: RequestTracker,
    dispatcher: Dispatcher,
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

/// Drive one connection until it closes or the bridge shuts down
pub async fn run<S>(
    stream: S,
    peer: String,
    dispatcher: Dispatcher,
    mut bus_rx: broadcast::Receiver<EmsMessage>,
    cancel: CancellationToken,
) where
    S: AsyncRead + AsyncWrite + Send + 'static,
{
    // Dropping the guard (on any exit path) cancels frames this session
    // still has queued at the dispatcher.
    let _drop_guard = cancel.clone().drop_guard();

    let (reader, writer) = tokio::io::split(stream);
    let mut lines = BufReader::new(reader).lines();
    let mut state = SessionState {
        writer,
        tracker: RequestTracker::new(),
        dispatcher,
        cancel: cancel.clone(),
        deadline: None,
    };

    loop {
        let result = tokio::select! {
            _ = cancel.cancelled() => break,
            line = lines.next_line() => match line {
                Ok(Some(line)) => state.handle_line(&line).await,
                Ok(None) => break,
                Err(e) => {
                    debug!(%peer, "connection read failed: {}", e);
                    break;
                }
            },
            frame = bus_rx.recv() => match frame {
                Ok(frame) => state.handle_frame(&frame).await,
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(%peer, missed, "session lagged behind the bus fan-out");
                    Ok(())
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            _ = wait_for(state.deadline), if state.deadline.is_some() => {
                state.handle_timeout().await
            }
        };

        if let Err(e) = result {
            debug!(%peer, "session ended: {}", e);
            break;
        }
    }
    debug!(%peer, "command client disconnected");
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

impl<W> SessionState<W>
where
    W: AsyncWrite + Unpin,
{
    async fn handle_line(&mut self, line: &str) -> Result<()> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }
        // The bus takes one request at a time; don't even parse.
        if self.tracker.waiting_for_response() {
            return self.respond("ERRBUSY").await;
        }

        match parser::parse(line) {
            Err(CommandError::UnknownCommand) => self.respond("ERRCMD").await,
            Err(CommandError::InvalidArgs) => self.respond("ERRARGS").await,
            Ok(CommandAction::Info(text)) => self.respond(text).await,
            Ok(CommandAction::Read {
                destination,
                msg_type,
                offset,
                length,
            }) => {
                let step = self.tracker.start_read(destination, msg_type, offset, length);
                self.apply(step).await
            }
            Ok(CommandAction::Write {
                destination,
                msg_type,
                offset,
                payload,
            }) => {
                let step = self
                    .tracker
                    .start_write(destination, msg_type, offset, &payload);
                self.apply(step).await
            }
        }
    }

    async fn handle_frame(&mut self, frame: &EmsMessage) -> Result<()> {
        match self.tracker.on_frame(frame) {
            Some(step) => self.apply(step).await,
            None => Ok(()),
        }
    }

    async fn handle_timeout(&mut self) -> Result<()> {
        self.deadline = None;
        let step = self.tracker.on_timeout();
        self.apply(step).await
    }

    async fn apply(&mut self, step: Step) -> Result<()> {
        for line in &step.lines {
            self.respond(line).await?;
        }
        if let Some(message) = step.send {
            self.dispatcher
                .enqueue(message, self.cancel.clone())
                .await?;
            self.deadline = Some(Instant::now() + RESPONSE_TIMEOUT);
        } else if !self.tracker.waiting_for_response() {
            self.deadline = None;
        }
        Ok(())
    }

    async fn respond(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;
        Ok(())
    }
}
