use crate::error::{BraviaError, Result};
use std::net::{Ipv4Addr, SocketAddr};
use tokio::net::UdpSocket;

/// UDP port Wake-on-LAN listeners use
pub const WOL_PORT: u16 = 9;

/// Length of a magic packet: 6 sync bytes + 16 repetitions of the address
pub const MAGIC_PACKET_LEN: usize = 6 + 16 * 6;

/// Parse a hardware address written as `aa:bb:cc:dd:ee:ff` or `aa-bb-cc-dd-ee-ff`
pub fn parse_mac(mac: &str) -> Result<[u8; 6]> {
    let invalid = || BraviaError::InvalidMac(mac.to_string());

    let parts: Vec<&str> = mac.trim().split([':', '-']).collect();
    if parts.len() != 6 {
        return Err(invalid());
    }

    let mut bytes = [0u8; 6];
    for (byte, part) in bytes.iter_mut().zip(parts) {
        if part.len() != 2 {
            return Err(invalid());
        }
        *byte = u8::from_str_radix(part, 16).map_err(|_| invalid())?;
    }
    Ok(bytes)
}

/// Build the magic packet for the given hardware address
pub fn magic_packet(mac: [u8; 6]) -> [u8; MAGIC_PACKET_LEN] {
    let mut packet = [0xFFu8; MAGIC_PACKET_LEN];
    for chunk in packet[6..].chunks_exact_mut(6) {
        chunk.copy_from_slice(&mac);
    }
    packet
}

/// Broadcast a magic packet to port 9. Fire and forget.
pub async fn wake(mac: &str) -> Result<()> {
    let packet = magic_packet(parse_mac(mac)?);

    let socket = UdpSocket::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))).await?;
    socket.set_broadcast(true)?;
    socket
        .send_to(&packet, SocketAddr::from((Ipv4Addr::BROADCAST, WOL_PORT)))
        .await?;

    tracing::info!("Sent Wake-on-LAN packet to {}", mac);
    Ok(())
}
