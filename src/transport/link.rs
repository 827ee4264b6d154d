//! Bus link transports
//!
//! The bridge talks to the EMS bus through an adapter that does the
//! byte-level work (CRC, break handling). Each telegram crosses the link as
//! one length-prefixed record, either over a TCP tunnel or a local serial
//! device. Only parsed `EmsMessage` values cross this boundary.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio_serial::SerialPortBuilderExt;
use tracing::debug;

use crate::config::BusTarget;
use crate::protocol::EmsMessage;
use crate::utils::{BridgeError, Result};

/// Message-level interface to the bus adapter
#[async_trait]
pub trait BusLink: Send {
    async fn send(&mut self, message: &EmsMessage) -> Result<()>;
    async fn recv(&mut self) -> Result<EmsMessage>;
}

/// Length-prefixed telegram framing over any byte stream
pub struct FramedLink<T> {
    io: T,
}

impl<T> FramedLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    pub fn new(io: T) -> Self {
        Self { io }
    }
}

#[async_trait]
impl<T> BusLink for FramedLink<T>
where
    T: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn send(&mut self, message: &EmsMessage) -> Result<()> {
        let wire = message.to_wire();
        let len = u8::try_from(wire.len())
            .map_err(|_| BridgeError::protocol(format!("Telegram too long: {} bytes", wire.len())))?;
        debug!(
            "sending telegram: dest {:#04x}, type {:#04x}, {} bytes",
            message.destination, message.msg_type, len
        );
        self.io.write_all(&[len]).await?;
        self.io.write_all(&wire).await?;
        self.io.flush().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Result<EmsMessage> {
        let len = self.io.read_u8().await?;
        let mut buffer = vec![0u8; usize::from(len)];
        self.io.read_exact(&mut buffer).await?;
        EmsMessage::from_wire(&buffer)
    }
}

/// Open the configured transport
pub async fn connect(target: &BusTarget) -> Result<Box<dyn BusLink>> {
    match target {
        BusTarget::Tcp { host, port } => {
            let stream = TcpStream::connect((host.as_str(), *port))
                .await
                .map_err(|e| BridgeError::link(format!("connect {}:{}: {}", host, port, e)))?;
            stream.set_nodelay(true)?;
            Ok(Box::new(FramedLink::new(stream)))
        }
        BusTarget::Serial { device, baud } => {
            let port = tokio_serial::new(device, *baud)
                .open_native_async()
                .map_err(|e| BridgeError::link(format!("open {}: {}", device, e)))?;
            Ok(Box::new(FramedLink::new(port)))
        }
    }
}
