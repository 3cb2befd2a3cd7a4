//! TCP transport to the hub's two services.
//!
//! Architecture:
//! - [`TcpTransport`] opens one [`Connection`] per exchange and never keeps it
//!   past the call that opened it.
//! - [`Connection`] owns the stream.  It is handed to the caller by value, so
//!   the socket closes when the connection drops, on success and on error.
//! - [`read_response`] reads a header, then exactly the declared payload, with
//!   a fresh read timeout for each read.

use std::future::Future;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use platin_core::protocol::codec::hex;
use platin_core::{
    ControlCommand, ControlResponse, MediaCommand, MediaResponse, ResponseFrame,
};
use tokio::{
    io::{AsyncRead, AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    time,
};
use tracing::debug;

use crate::application::hub::{Hub, HubTransport};
use crate::domain::{HubConfig, HubError};

/// Reads one response frame of type `R` from `stream`.
///
/// Each of the two reads (header, payload) gets its own `read_timeout`.  A
/// stream that ends early surfaces as [`HubError::Io`] with
/// `UnexpectedEof`.
///
/// # Errors
///
/// Returns [`HubError::ReadTimeout`], [`HubError::Io`], or
/// [`HubError::Protocol`] if the header is inconsistent.
pub async fn read_response<R, S>(stream: &mut S, read_timeout: Duration) -> Result<R, HubError>
where
    R: ResponseFrame,
    S: AsyncRead + Unpin,
{
    let mut header = vec![0u8; R::HEADER_SIZE];
    read_exact_within(stream, &mut header, read_timeout).await?;

    let payload_len = R::payload_len(&header)?;
    let mut payload = vec![0u8; payload_len];
    if payload_len > 0 {
        read_exact_within(stream, &mut payload, read_timeout).await?;
    }

    Ok(R::from_parts(&header, payload)?)
}

async fn read_exact_within<S>(
    stream: &mut S,
    buf: &mut [u8],
    read_timeout: Duration,
) -> Result<(), HubError>
where
    S: AsyncRead + Unpin,
{
    match time::timeout(read_timeout, stream.read_exact(buf)).await {
        Ok(Ok(_)) => Ok(()),
        Ok(Err(e)) => Err(HubError::Io(e)),
        Err(_) => Err(HubError::ReadTimeout(read_timeout)),
    }
}

/// One open TCP connection to a hub service.
///
/// The socket closes when the value drops.
pub struct Connection {
    stream: TcpStream,
    addr: String,
    read_timeout: Duration,
}

impl Connection {
    fn new(stream: TcpStream, addr: String, read_timeout: Duration) -> Self {
        Self {
            stream,
            addr,
            read_timeout,
        }
    }

    /// Writes a complete encoded frame.
    pub async fn write_frame(&mut self, frame: &[u8]) -> Result<(), HubError> {
        self.stream.write_all(frame).await?;
        debug!("sent to {}: {}", self.addr, hex(frame));
        Ok(())
    }

    /// Reads one response frame.
    pub async fn read_response<R: ResponseFrame>(&mut self) -> Result<R, HubError> {
        read_response(&mut self.stream, self.read_timeout).await
    }

    /// Writes `frame` and reads its response.
    pub async fn exchange<R: ResponseFrame>(&mut self, frame: &[u8]) -> Result<R, HubError> {
        self.write_frame(frame).await?;
        self.read_response().await
    }

    /// Local address this connection goes out from.
    pub fn local_ip(&self) -> Result<IpAddr, HubError> {
        Ok(self.stream.local_addr()?.ip())
    }

    /// Sends the media-service register command and consumes its reply.
    ///
    /// The payload is the local IP of this very connection, which is the
    /// address the hub sees the client on.
    pub async fn register(&mut self) -> Result<MediaResponse, HubError> {
        let local_ip = self.local_ip()?;
        let frame = MediaCommand::Register { local_ip }.encode()?;
        let resp = self.exchange::<MediaResponse>(&frame).await?;
        debug!("registered as {local_ip}: {resp}");
        Ok(resp)
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        debug!("closing connection to {}", self.addr);
    }
}

/// [`HubTransport`] over plain TCP.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    config: HubConfig,
}

impl TcpTransport {
    pub fn new(config: HubConfig) -> Self {
        Self { config }
    }

    /// Opens a connection to `port` on the configured host, bounded by the
    /// connect timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HubError::Connect`] or [`HubError::ConnectTimeout`].
    pub async fn open(&self, port: u16) -> Result<Connection, HubError> {
        let addr = self.config.display_addr(port);
        let host = self
            .config
            .host
            .trim_start_matches('[')
            .trim_end_matches(']');
        debug!("connecting to {addr}");

        let connect = TcpStream::connect((host, port));
        match time::timeout(self.config.connect_timeout, connect).await {
            Ok(Ok(stream)) => Ok(Connection::new(stream, addr, self.config.read_timeout)),
            Ok(Err(source)) => Err(HubError::Connect { addr, source }),
            Err(_) => Err(HubError::ConnectTimeout {
                addr,
                timeout: self.config.connect_timeout,
            }),
        }
    }

    /// Connects, writes `frame`, and closes without reading.
    pub async fn connect_and_send(&self, port: u16, frame: &[u8]) -> Result<(), HubError> {
        let mut conn = self.open(port).await?;
        conn.write_frame(frame).await
    }

    /// Connects, writes `frame`, reads one `R`, and closes.
    pub async fn connect_and_send_receive<R: ResponseFrame>(
        &self,
        port: u16,
        frame: &[u8],
    ) -> Result<R, HubError> {
        let mut conn = self.open(port).await?;
        conn.exchange(frame).await
    }

    /// Connects and hands the connection to `op` for a multi-step exchange.
    ///
    /// The connection closes when `op`'s future completes.
    pub async fn connect_and_run<F, Fut, T>(&self, port: u16, op: F) -> Result<T, HubError>
    where
        F: FnOnce(Connection) -> Fut,
        Fut: Future<Output = Result<T, HubError>>,
    {
        let conn = self.open(port).await?;
        op(conn).await
    }
}

#[async_trait]
impl HubTransport for TcpTransport {
    async fn send_control(&self, command: ControlCommand) -> Result<(), HubError> {
        let frame = command.encode()?;
        debug!("control send {command:?}");
        self.connect_and_send(self.config.control_port, &frame).await
    }

    async fn query_control(&self, command: ControlCommand) -> Result<ControlResponse, HubError> {
        let frame = command.encode()?;
        let resp: ControlResponse = self
            .connect_and_send_receive(self.config.control_port, &frame)
            .await?;
        debug!("control {command:?} -> {resp}");
        Ok(resp)
    }

    async fn media_exchange(&self, command: MediaCommand) -> Result<MediaResponse, HubError> {
        let frame = command.encode()?;
        let resp = self
            .connect_and_run(self.config.media_port, |mut conn| async move {
                conn.register().await?;
                conn.exchange::<MediaResponse>(&frame).await
            })
            .await?;
        debug!("media {command:?} -> {resp}");
        Ok(resp)
    }
}

impl Hub<TcpTransport> {
    /// Creates a hub client that talks TCP to `config.host`.
    pub fn new(config: HubConfig) -> Self {
        Hub::with_transport(TcpTransport::new(config))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::ErrorKind;

    use platin_core::ProtocolError;
    use tokio::net::TcpListener;
    use tokio_test::io::Builder;

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn local_config(control_port: u16, media_port: u16) -> HubConfig {
        HubConfig {
            control_port,
            media_port,
            ..HubConfig::new("127.0.0.1")
        }
    }

    #[tokio::test]
    async fn test_read_response_control_power_reply() {
        // Arrange: header and payload arrive as separate reads.
        let mut stream = Builder::new()
            .read(&[0x00, 0x04, 0x00, 0x02, 0x0D])
            .read(&[0x01])
            .build();

        // Act
        let resp: ControlResponse = read_response(&mut stream, TIMEOUT).await.unwrap();

        // Assert
        assert_eq!(resp.response_type, [0x00, 0x02, 0x0D]);
        assert_eq!(resp.payload, vec![0x01]);
    }

    #[tokio::test]
    async fn test_read_response_control_empty_payload_skips_second_read() {
        let mut stream = Builder::new().read(&[0x00, 0x03, 0x00, 0x02, 0x0F]).build();

        let resp: ControlResponse = read_response(&mut stream, TIMEOUT).await.unwrap();

        assert!(resp.payload.is_empty());
    }

    #[tokio::test]
    async fn test_read_response_media_volume_reply() {
        let mut stream = Builder::new()
            .read(&[0x00, 0x00, 0x01, 0x40, 0x00, 0x00, 0x00, 0x00, 0x00, 0x02])
            .read(b"42")
            .build();

        let resp: MediaResponse = read_response(&mut stream, TIMEOUT).await.unwrap();

        assert_eq!(resp.volume().unwrap(), 42);
    }

    #[tokio::test]
    async fn test_read_response_truncated_payload_is_io_error() {
        // Arrange: declares 4 payload bytes, delivers 1, then EOF.
        let mut stream = Builder::new()
            .read(&[0x00, 0x07, 0x00, 0x02, 0x01])
            .read(b"{")
            .build();

        // Act
        let result = read_response::<ControlResponse, _>(&mut stream, TIMEOUT).await;

        // Assert
        match result {
            Err(HubError::Io(e)) => assert_eq!(e.kind(), ErrorKind::UnexpectedEof),
            other => panic!("expected UnexpectedEof, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_read_response_truncated_header_is_io_error() {
        let mut stream = Builder::new().read(&[0x00, 0x04]).build();

        let result = read_response::<ControlResponse, _>(&mut stream, TIMEOUT).await;

        assert!(matches!(result, Err(HubError::Io(_))));
    }

    #[tokio::test]
    async fn test_read_response_length_underflow_is_protocol_error() {
        let mut stream = Builder::new().read(&[0x00, 0x02, 0x00, 0x02, 0x0D]).build();

        let result = read_response::<ControlResponse, _>(&mut stream, TIMEOUT).await;

        assert!(matches!(
            result,
            Err(HubError::Protocol(ProtocolError::LengthUnderflow(2)))
        ));
    }

    #[tokio::test]
    async fn test_read_response_silent_peer_times_out() {
        // Arrange: keep the writer half alive so the read blocks.
        let (mut client, _server) = tokio::io::duplex(64);

        // Act
        let result =
            read_response::<ControlResponse, _>(&mut client, Duration::from_millis(20)).await;

        // Assert
        assert!(matches!(result, Err(HubError::ReadTimeout(_))));
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_open_full_backlog_is_connect_timeout() {
        // Arrange: a listener that never accepts.  Once its queue is full the
        // kernel drops further SYNs, so the next connect hangs.
        let socket = tokio::net::TcpSocket::new_v4().unwrap();
        socket.bind("127.0.0.1:0".parse().unwrap()).unwrap();
        let listener = socket.listen(1).unwrap();
        let port = listener.local_addr().unwrap().port();
        let mut queued = Vec::new();
        for _ in 0..8 {
            let attempt = time::timeout(
                Duration::from_millis(100),
                TcpStream::connect(("127.0.0.1", port)),
            )
            .await;
            match attempt {
                Ok(Ok(stream)) => queued.push(stream),
                _ => break,
            }
        }
        let transport = TcpTransport::new(HubConfig {
            connect_timeout: Duration::from_millis(200),
            ..local_config(port, port)
        });

        // Act
        let result = transport.open(port).await;

        // Assert
        match result {
            Err(HubError::ConnectTimeout { addr, timeout }) => {
                assert_eq!(addr, format!("127.0.0.1:{port}"));
                assert_eq!(timeout, Duration::from_millis(200));
            }
            Err(other) => panic!("expected ConnectTimeout, got {other:?}"),
            Ok(_) => panic!("expected ConnectTimeout"),
        }
        drop(queued);
        drop(listener);
    }

    #[tokio::test]
    async fn test_connect_and_run_closes_connection_when_op_fails() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = TcpTransport::new(local_config(0, port));
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            sock.read_to_end(&mut received).await.unwrap();
            received
        });

        // Act: write one frame, then fail before reading anything.
        let result: Result<(), HubError> = transport
            .connect_and_run(port, |mut conn| async move {
                conn.write_frame(&[0xAB, 0xCD]).await?;
                Err(HubError::SourceNotFound)
            })
            .await;

        // Assert: the peer saw the frame followed by EOF.
        assert!(matches!(result, Err(HubError::SourceNotFound)));
        assert_eq!(server.await.unwrap(), vec![0xAB, 0xCD]);
    }

    #[tokio::test]
    async fn test_open_refused_port_is_connect_error() {
        // Arrange: grab a free port, then release it.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let transport = TcpTransport::new(local_config(port, port));

        // Act
        let result = transport.open(port).await;

        // Assert
        match result {
            Err(HubError::Connect { addr, .. }) => assert_eq!(addr, format!("127.0.0.1:{port}")),
            Err(other) => panic!("expected Connect, got {other:?}"),
            Ok(_) => panic!("expected Connect error"),
        }
    }

    #[tokio::test]
    async fn test_send_control_writes_frame_and_closes() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = TcpTransport::new(local_config(port, 0));
        let server = tokio::spawn(async move {
            let (mut sock, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            // read_to_end only returns once the client has closed.
            sock.read_to_end(&mut received).await.unwrap();
            received
        });

        // Act
        transport
            .send_control(ControlCommand::SetPower { on: true })
            .await
            .unwrap();

        // Assert
        let received = server.await.unwrap();
        assert_eq!(received, vec![0x00, 0x04, 0x03, 0x02, 0x0F, 0x01]);
    }

    #[tokio::test]
    async fn test_media_exchange_registers_before_command() {
        // Arrange
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let transport = TcpTransport::new(local_config(0, port));
        let server = tokio::spawn(async move {
            let (mut sock, peer) = listener.accept().await.unwrap();
            let mut frames = Vec::new();
            for reply in [&b""[..], &b"17"[..]] {
                let mut header = [0u8; 10];
                sock.read_exact(&mut header).await.unwrap();
                let mut payload = vec![0u8; header[8] as usize];
                sock.read_exact(&mut payload).await.unwrap();
                frames.push((header, payload));

                let mut out = vec![0x00, 0x00, header[2], header[3], 0x00, 0x00, 0x00, 0x00];
                out.extend_from_slice(&(reply.len() as u16).to_be_bytes());
                out.extend_from_slice(reply);
                sock.write_all(&out).await.unwrap();
            }
            (frames, peer.ip())
        });

        // Act
        let resp = transport.media_exchange(MediaCommand::GetVolume).await.unwrap();

        // Assert
        let (frames, peer_ip) = server.await.unwrap();
        assert_eq!(resp.volume().unwrap(), 17);
        assert_eq!(frames.len(), 2);
        assert_eq!(&frames[0].0[2..4], &[0x02, 0x03]);
        assert_eq!(frames[0].1, peer_ip.to_string().into_bytes());
        assert_eq!(&frames[1].0[2..4], &[0x01, 0x40]);
    }
}
