//! UDP-first, TCP-on-truncation DNS transport (spec §4.1): `query` sends a
//! single question and returns the parsed response, the protocol actually
//! used, and a classified error. Grounded on the teacher's
//! `resolver.rs::send_query_with_timeout`/`send_udp_query`/`send_tcp_query`,
//! stripped of connection pooling, health tracking and in-flight dedup,
//! none of which the spec calls for.

use std::net::SocketAddr;
use std::time::Duration;

use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, UdpSocket};
use tokio::time::timeout;
use tracing::{debug, trace};

use crate::dns::{DNSPacket, ParseError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Udp,
    Tcp,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("query timed out")]
    Timeout,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed response: {0}")]
    Parse(#[from] ParseError),
}

/// Sends `query` to `server:port`, falling back from UDP to TCP when the
/// UDP response carries the TC bit (RFC 1035 §4.2.1). Returns the parsed
/// response and the protocol that produced it.
pub async fn query(
    server: SocketAddr,
    query: &DNSPacket,
    udp_max_size: u16,
    query_timeout: Duration,
) -> Result<(DNSPacket, Protocol), TransportError> {
    let bytes = query.serialize()?;
    timeout(query_timeout, query_via_udp_then_tcp(server, &bytes, udp_max_size))
        .await
        .map_err(|_| TransportError::Timeout)?
}

async fn query_via_udp_then_tcp(
    server: SocketAddr,
    bytes: &[u8],
    udp_max_size: u16,
) -> Result<(DNSPacket, Protocol), TransportError> {
    let response = send_udp(server, bytes, udp_max_size).await?;
    if response.header.tc {
        debug!("truncated UDP response from {}, retrying over TCP", server);
        let response = send_tcp(server, bytes).await?;
        Ok((response, Protocol::Tcp))
    } else {
        Ok((response, Protocol::Udp))
    }
}

async fn send_udp(
    server: SocketAddr,
    bytes: &[u8],
    udp_max_size: u16,
) -> Result<DNSPacket, TransportError> {
    let bind_addr = if server.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
    let socket = UdpSocket::bind(bind_addr).await?;
    socket.connect(server).await?;
    socket.send(bytes).await?;

    let mut buf = vec![0u8; udp_max_size as usize];
    let len = socket.recv(&mut buf).await?;
    trace!("received {} bytes over UDP from {}", len, server);
    Ok(DNSPacket::parse(&buf[..len])?)
}

async fn send_tcp(server: SocketAddr, bytes: &[u8]) -> Result<DNSPacket, TransportError> {
    let mut stream = TcpStream::connect(server).await?;

    let len = bytes.len() as u16;
    stream.write_all(&len.to_be_bytes()).await?;
    stream.write_all(bytes).await?;
    stream.flush().await?;

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).await?;
    let response_len = u16::from_be_bytes(len_buf) as usize;

    let mut response_buf = vec![0u8; response_len];
    stream.read_exact(&mut response_buf).await?;
    trace!("received {} bytes over TCP from {}", response_len, server);
    Ok(DNSPacket::parse(&response_buf)?)
}
