//! Host identity as reported in heartbeats

use std::net::UdpSocket;

const UNKNOWN_HOST: &str = "UNKNOWN";
const LOOPBACK: &str = "127.0.0.1";

/// Hostname: explicit override, then the environment, then /etc/hostname
pub fn resolve_hostname(configured: Option<&str>) -> String {
    let candidates = [
        configured.map(str::to_string),
        std::env::var("HOSTNAME").ok(),
        std::env::var("COMPUTERNAME").ok(),
        std::fs::read_to_string("/etc/hostname").ok(),
    ];

    candidates
        .into_iter()
        .flatten()
        .map(|name| name.trim().to_string())
        .find(|name| !name.is_empty())
        .unwrap_or_else(|| UNKNOWN_HOST.to_string())
}

/// Address of the interface used for outbound traffic, or loopback
pub fn resolve_ip(configured: Option<&str>) -> String {
    if let Some(ip) = configured.map(str::trim).filter(|ip| !ip.is_empty()) {
        return ip.to_string();
    }

    // Connecting a UDP socket sends nothing; it only selects a route.
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|_| LOOPBACK.to_string())
}
