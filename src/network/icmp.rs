//! ICMP implementation for native ping functionality
//!
//! Sends a single echo request over a raw IPv4 socket and waits for the
//! matching echo reply. Raw sockets need elevated privileges; without them
//! every host is reported down, the same way a refused `ping` would be.

use std::io::{ErrorKind, Read};
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::debug;
use pnet::packet::icmp::echo_reply::EchoReplyPacket;
use pnet::packet::icmp::echo_request::MutableEchoRequestPacket;
use pnet::packet::icmp::{checksum, IcmpCode, IcmpPacket, IcmpTypes};
use pnet::packet::ip::IpNextHeaderProtocols;
use pnet::packet::ipv4::Ipv4Packet;
use rand::Rng;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};

use super::{HostStatus, Prober, ECHO_WAIT};
use crate::error::ProbeError;

/// Echo header (8) plus a small payload
const ECHO_REQUEST_LEN: usize = 16;

/// Large enough for an IPv4 header with options and our echo reply
const RECV_BUFFER_LEN: usize = 1500;

/// Native ICMP pinger
#[derive(Debug, Clone)]
pub struct IcmpPinger {
    wait: Duration,
}

impl Default for IcmpPinger {
    fn default() -> Self {
        Self::new()
    }
}

impl IcmpPinger {
    pub fn new() -> Self {
        Self { wait: ECHO_WAIT }
    }
}

#[async_trait]
impl Prober for IcmpPinger {
    async fn probe(&self, host: &str) -> Result<HostStatus, ProbeError> {
        let target = match resolve_ipv4(host).await {
            Some(ip) => ip,
            None => {
                debug!("{}: no IPv4 address, reporting down", host);
                return Ok(HostStatus::Down);
            }
        };

        let wait = self.wait;
        let status = tokio::task::spawn_blocking(move || echo(target, wait))
            .await
            .map_err(|e| ProbeError::Runtime(e.to_string()))??;

        debug!("{} ({}): {}", host, target, status);
        Ok(status)
    }

    fn name(&self) -> &str {
        "icmp"
    }
}

/// Resolve a host token to its first IPv4 address
async fn resolve_ipv4(host: &str) -> Option<Ipv4Addr> {
    match host.parse::<IpAddr>() {
        Ok(IpAddr::V4(ip)) => return Some(ip),
        Ok(IpAddr::V6(_)) => return None,
        Err(_) => {}
    }

    let addrs = tokio::net::lookup_host((host, 0)).await.ok()?;
    addrs.into_iter().find_map(|addr| match addr {
        SocketAddr::V4(v4) => Some(*v4.ip()),
        SocketAddr::V6(_) => None,
    })
}

/// Send one echo request and wait for its reply
fn echo(target: Ipv4Addr, wait: Duration) -> Result<HostStatus, ProbeError> {
    let socket = match Socket::new(Domain::IPV4, Type::RAW, Some(Protocol::ICMPV4)) {
        Ok(socket) => socket,
        Err(e) if e.kind() == ErrorKind::PermissionDenied => {
            debug!("{}: raw ICMP socket not permitted, reporting down", target);
            return Ok(HostStatus::Down);
        }
        Err(e) => return Err(ProbeError::Socket(e)),
    };

    let mut rng = rand::thread_rng();
    let identifier = rng.gen::<u16>();
    let sequence = rng.gen::<u16>();

    let request = match build_echo_request(identifier, sequence) {
        Some(request) => request,
        None => return Err(ProbeError::Runtime("failed to build echo request".to_string())),
    };

    let destination = SockAddr::from(SocketAddrV4::new(target, 0));
    if let Err(e) = socket.send_to(&request, &destination) {
        debug!("{}: send failed: {}", target, e);
        return Ok(HostStatus::Down);
    }

    let deadline = Instant::now() + wait;
    let mut buffer = [0u8; RECV_BUFFER_LEN];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Ok(HostStatus::Down);
        }
        if socket.set_read_timeout(Some(remaining)).is_err() {
            return Ok(HostStatus::Down);
        }

        match (&socket).read(&mut buffer) {
            Ok(received) => {
                if is_matching_reply(&buffer[..received], target, identifier, sequence) {
                    return Ok(HostStatus::Up);
                }
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                return Ok(HostStatus::Down);
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                debug!("{}: receive failed: {}", target, e);
                return Ok(HostStatus::Down);
            }
        }
    }
}

/// Build an echo request with its checksum filled in
fn build_echo_request(identifier: u16, sequence: u16) -> Option<[u8; ECHO_REQUEST_LEN]> {
    let mut buffer = [0u8; ECHO_REQUEST_LEN];
    {
        let mut packet = MutableEchoRequestPacket::new(&mut buffer)?;
        packet.set_icmp_type(IcmpTypes::EchoRequest);
        packet.set_icmp_code(IcmpCode::new(0));
        packet.set_identifier(identifier);
        packet.set_sequence_number(sequence);
        packet.set_payload(b"pinghost");
    }

    let sum = checksum(&IcmpPacket::new(&buffer)?);
    let mut packet = MutableEchoRequestPacket::new(&mut buffer)?;
    packet.set_checksum(sum);
    Some(buffer)
}

/// Check whether a raw IPv4 datagram is the reply to our request.
///
/// Raw sockets see every ICMP packet on the host, including our own request
/// on loopback and replies meant for concurrent probes.
fn is_matching_reply(datagram: &[u8], target: Ipv4Addr, identifier: u16, sequence: u16) -> bool {
    let ip_packet = match Ipv4Packet::new(datagram) {
        Some(packet) => packet,
        None => return false,
    };

    if ip_packet.get_next_level_protocol() != IpNextHeaderProtocols::Icmp
        || ip_packet.get_source() != target
    {
        return false;
    }

    let header_len = usize::from(ip_packet.get_header_length()) * 4;
    if datagram.len() < header_len {
        return false;
    }

    match EchoReplyPacket::new(&datagram[header_len..]) {
        Some(reply) => {
            reply.get_icmp_type() == IcmpTypes::EchoReply
                && reply.get_identifier() == identifier
                && reply.get_sequence_number() == sequence
        }
        None => false,
    }
}
