use super::Outcome;
use crate::error::ProbeError;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::net::UdpSocket;
use tokio::time::timeout;

const NTP_PORT: u16 = 123;
const NTP_PACKET_LEN: usize = 48;
/// Seconds between the NTP epoch (1900) and the Unix epoch (1970).
const NTP_UNIX_OFFSET: f64 = 2_208_988_800.0;
const QUERY_TIMEOUT: Duration = Duration::from_secs(5);

/// Clock offset between this host and `server`, via a single SNTP exchange.
pub async fn ntp_skew(server: &str) -> Result<Outcome, ProbeError> {
    let offset = query_offset(server).await?;
    Ok(Outcome::healthy(format_offset(offset)))
}

async fn query_offset(server: &str) -> Result<f64, ProbeError> {
    let addr = if server.contains(':') {
        server.to_string()
    } else {
        format!("{}:{}", server, NTP_PORT)
    };
    let ntp_err = |e: std::io::Error| ProbeError::Ntp(e.to_string());

    let socket = UdpSocket::bind("0.0.0.0:0").await.map_err(ntp_err)?;
    socket.connect(&addr).await.map_err(ntp_err)?;

    // LI = 0, VN = 3, Mode = 3 (client)
    let mut request = [0u8; NTP_PACKET_LEN];
    request[0] = 0x1B;

    let sent_at = unix_now();
    socket.send(&request).await.map_err(ntp_err)?;

    let mut response = [0u8; NTP_PACKET_LEN];
    let len = timeout(QUERY_TIMEOUT, socket.recv(&mut response))
        .await
        .map_err(|_| ProbeError::Ntp(format!("timed out waiting for {}", addr)))?
        .map_err(ntp_err)?;
    let received_at = unix_now();

    if len < NTP_PACKET_LEN {
        return Err(ProbeError::Ntp(format!("short response ({} bytes)", len)));
    }

    Ok(clock_offset(&response, sent_at, received_at))
}

/// `((T2 - T1) + (T3 - T4)) / 2` from a server response.
pub fn clock_offset(response: &[u8; NTP_PACKET_LEN], sent_at: f64, received_at: f64) -> f64 {
    let server_receive = read_timestamp(&response[32..40]);
    let server_transmit = read_timestamp(&response[40..48]);
    ((server_receive - sent_at) + (server_transmit - received_at)) / 2.0
}

/// NTP 32.32 fixed-point timestamp to Unix seconds.
fn read_timestamp(bytes: &[u8]) -> f64 {
    let secs = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64;
    let frac = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]) as f64;
    secs + frac / 4_294_967_296.0 - NTP_UNIX_OFFSET
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

fn format_offset(offset: f64) -> String {
    format!("{:.6}s", offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_timestamp(buf: &mut [u8], unix: f64) {
        let ntp = unix + NTP_UNIX_OFFSET;
        let secs = ntp.trunc() as u32;
        let frac = (ntp.fract() * 4_294_967_296.0) as u32;
        buf[..4].copy_from_slice(&secs.to_be_bytes());
        buf[4..8].copy_from_slice(&frac.to_be_bytes());
    }

    #[test]
    fn test_clock_offset_server_ahead() {
        let mut response = [0u8; NTP_PACKET_LEN];
        // Server clock is 2s ahead, 100ms round trip
        write_timestamp(&mut response[32..40], 1_000_002.05);
        write_timestamp(&mut response[40..48], 1_000_002.05);
        let offset = clock_offset(&response, 1_000_000.0, 1_000_000.1);
        assert!((offset - 2.0).abs() < 1e-3, "offset was {}", offset);
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(-0.0025), "-0.002500s");
    }

    #[tokio::test]
    async fn test_query_against_local_responder() {
        let server = UdpSocket::bind("127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        tokio::spawn(async move {
            let mut buf = [0u8; NTP_PACKET_LEN];
            let (_, peer) = server.recv_from(&mut buf).await.unwrap();
            let mut reply = [0u8; NTP_PACKET_LEN];
            let now = unix_now();
            write_timestamp(&mut reply[32..40], now);
            write_timestamp(&mut reply[40..48], now);
            server.send_to(&reply, peer).await.unwrap();
        });

        let outcome = ntp_skew(&addr.to_string()).await.unwrap();
        assert!(outcome.healthy);
        let secs: f64 = outcome.output.trim_end_matches('s').parse().unwrap();
        assert!(secs.abs() < 1.0);
    }
}
