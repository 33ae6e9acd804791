//! Captive portal over host sockets
//!
//! Non-blocking TCP listener for HTTP and a UDP socket for wildcard DNS.
//! Each pump accepts a bounded number of connections and datagrams, so a
//! busy client cannot stall the tick loop.

use std::collections::VecDeque;
use std::io::{ErrorKind, Read, Write};
use std::net::{IpAddr, SocketAddr, TcpListener, TcpStream, UdpSocket};
use std::time::{Duration, Instant};

use embassy_sync::blocking_mutex::raw::RawMutex;
use log::{debug, info, warn};
use tenbin_core::provisioning::{PortalTarget, PumpReport, WebCollaborator, WebError};
use tenbin_core::render::{Label, RenderLock};
use tenbin_hal::{HardwarePort, WifiCredentials};
use tenbin_portal::{dns, CaptivePortal, Exchange, Outcome, Request, RequestError};

/// Connections accepted per pump
const ACCEPT_BUDGET: usize = 4;
/// DNS datagrams answered per pump
const DNS_BUDGET: usize = 8;
/// Receive buffer per HTTP connection
const RECV_LEN: usize = 4096;
/// Total time one connection may take to deliver its request
const CONNECTION_DEADLINE: Duration = Duration::from_millis(50);

pub struct TcpPortal {
    bind: IpAddr,
    http: Option<TcpListener>,
    dns: Option<UdpSocket>,
    portal: Option<CaptivePortal>,
    /// Requests submitted from the console rather than a socket
    injected: VecDeque<Vec<u8>>,
}

impl TcpPortal {
    pub fn new(bind: IpAddr) -> Self {
        Self {
            bind,
            http: None,
            dns: None,
            portal: None,
            injected: VecDeque::new(),
        }
    }

    pub fn is_running(&self) -> bool {
        self.portal.is_some()
    }

    pub fn http_addr(&self) -> Option<SocketAddr> {
        self.http.as_ref().and_then(|l| l.local_addr().ok())
    }

    pub fn dns_addr(&self) -> Option<SocketAddr> {
        self.dns.as_ref().and_then(|s| s.local_addr().ok())
    }

    /// Queue a form submission as a phone would send it
    pub fn inject_submission(&mut self, ssid: &str, password: &str) {
        let raw = format!(
            "GET /config?ssid={}&password={} HTTP/1.1\r\nHost: console\r\n\r\n",
            form_encode(ssid),
            form_encode(password)
        );
        self.injected.push_back(raw.into_bytes());
    }

    fn serve_http<P: HardwarePort, M: RawMutex>(
        &mut self,
        port: &mut P,
        surface: &RenderLock<M>,
        report: &mut PumpReport,
    ) {
        while let Some(raw) = self.injected.pop_front() {
            if let Some(exchange) = self.exchange(&raw, port) {
                record(&exchange, surface, report);
            }
        }

        for _ in 0..ACCEPT_BUDGET {
            let Some(listener) = self.http.as_ref() else {
                return;
            };
            let (stream, peer) = match listener.accept() {
                Ok(conn) => conn,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(e) => {
                    warn!("HTTP accept failed: {}", e);
                    return;
                }
            };
            if let Err(e) = self.serve_connection(stream, port, surface, report) {
                debug!("HTTP client {} dropped: {}", peer, e);
            }
        }
    }

    fn serve_connection<P: HardwarePort, M: RawMutex>(
        &mut self,
        mut stream: TcpStream,
        port: &mut P,
        surface: &RenderLock<M>,
        report: &mut PumpReport,
    ) -> std::io::Result<()> {
        stream.set_nonblocking(false)?;
        stream.set_write_timeout(Some(CONNECTION_DEADLINE))?;
        let deadline = Instant::now() + CONNECTION_DEADLINE;

        let mut buf = vec![0u8; RECV_LEN];
        let mut len = 0;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(ErrorKind::TimedOut.into());
            }
            stream.set_read_timeout(Some(remaining))?;
            let n = stream.read(&mut buf[len..])?;
            if n == 0 {
                break;
            }
            len += n;
            match Request::parse(&buf[..len]) {
                Err(RequestError::Incomplete) if len < RECV_LEN => continue,
                _ => break,
            }
        }

        let Some(exchange) = self.exchange(&buf[..len], port) else {
            return Ok(());
        };
        record(&exchange, surface, report);

        let mut head = String::new();
        // Writing into a String cannot fail
        let _ = exchange.response.write_head(&mut head);
        stream.write_all(head.as_bytes())?;
        stream.write_all(exchange.response.body())?;
        stream.flush()
    }

    fn exchange<P: HardwarePort>(&mut self, raw: &[u8], port: &mut P) -> Option<Exchange> {
        let portal = self.portal.as_mut()?;
        match Request::parse(raw) {
            Ok(request) => {
                debug!("{:?} {}", request.method, request.path);
                Some(portal.handle(&request, |limit| port.scan_networks(limit)))
            }
            Err(e) => {
                debug!("Unparseable HTTP request: {:?}", e);
                None
            }
        }
    }

    fn serve_dns(&mut self, report: &mut PumpReport) {
        let (Some(socket), Some(portal)) = (self.dns.as_ref(), self.portal.as_ref()) else {
            return;
        };

        let mut query = [0u8; 512];
        let mut answer = [0u8; 512];
        for _ in 0..DNS_BUDGET {
            let (len, peer) = match socket.recv_from(&mut query) {
                Ok(datagram) => datagram,
                Err(e) if e.kind() == ErrorKind::WouldBlock => return,
                Err(e) => {
                    warn!("DNS receive failed: {}", e);
                    return;
                }
            };
            match dns::answer(&query[..len], portal.address(), &mut answer) {
                Ok(n) => {
                    if let Err(e) = socket.send_to(&answer[..n], peer) {
                        debug!("DNS reply to {} failed: {}", peer, e);
                    } else {
                        report.served += 1;
                    }
                }
                Err(e) => debug!("Ignoring DNS packet from {}: {:?}", peer, e),
            }
        }
    }
}

/// Fold one HTTP exchange into the pump report
fn record<M: RawMutex>(exchange: &Exchange, surface: &RenderLock<M>, report: &mut PumpReport) {
    report.served += 1;
    match exchange.outcome {
        Outcome::Accepted => {
            report.accepted += 1;
            surface.update(|s| s.set(Label::Status, "Credentials received"));
        }
        Outcome::Rejected(reason) => {
            report.rejected += 1;
            debug!("Submission rejected: {:?}", reason);
        }
        _ => {}
    }
}

/// `application/x-www-form-urlencoded` value encoding
fn form_encode(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            other => out.push_str(&format!("%{:02X}", other)),
        }
    }
    out
}

impl WebCollaborator for TcpPortal {
    fn start(&mut self, target: &PortalTarget<'_>) -> Result<(), WebError> {
        let http = TcpListener::bind((self.bind, target.http_port)).map_err(|e| {
            warn!("Binding HTTP {}:{}: {}", self.bind, target.http_port, e);
            WebError::Bind
        })?;
        let dns = UdpSocket::bind((self.bind, target.dns_port)).map_err(|e| {
            warn!("Binding DNS {}:{}: {}", self.bind, target.dns_port, e);
            WebError::Bind
        })?;
        http.set_nonblocking(true).map_err(|_| WebError::Io)?;
        dns.set_nonblocking(true).map_err(|_| WebError::Io)?;

        info!(
            "Portal listening on http://{}:{}/ (DNS udp/{}), redirecting to {}",
            self.bind, target.http_port, target.dns_port, target.redirect_url
        );
        self.http = Some(http);
        self.dns = Some(dns);
        self.portal = Some(CaptivePortal::new(target.address, target.redirect_url));
        Ok(())
    }

    fn stop(&mut self) {
        self.http = None;
        self.dns = None;
        self.portal = None;
        self.injected.clear();
    }

    fn pump<P: HardwarePort, M: RawMutex>(
        &mut self,
        port: &mut P,
        surface: &RenderLock<M>,
    ) -> PumpReport {
        let mut report = PumpReport::default();
        if self.portal.is_none() {
            return report;
        }
        self.serve_http(port, surface, &mut report);
        self.serve_dns(&mut report);
        report
    }

    fn take_credentials(&mut self) -> Option<WifiCredentials> {
        self.portal.as_mut()?.take_credentials()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_sync::blocking_mutex::raw::NoopRawMutex;
    use std::net::Ipv4Addr;
    use tenbin_drivers::{EmulatedOptions, EmulatedPort, MemoryStore};

    const AP: Ipv4Addr = Ipv4Addr::new(192, 168, 4, 1);

    fn started() -> TcpPortal {
        let mut portal = TcpPortal::new(IpAddr::from([127, 0, 0, 1]));
        portal
            .start(&PortalTarget {
                address: AP,
                http_port: 0,
                dns_port: 0,
                redirect_url: "http://192.168.4.1/",
            })
            .unwrap();
        portal
    }

    fn port() -> EmulatedPort<MemoryStore> {
        EmulatedPort::new(MemoryStore::new(), EmulatedOptions::default())
    }

    #[test]
    fn test_form_encode() {
        assert_eq!(form_encode("My Home"), "My+Home");
        assert_eq!(form_encode("a&b=c"), "a%26b%3Dc");
        assert_eq!(form_encode("café"), "caf%C3%A9");
    }

    #[test]
    fn test_injected_submission_latches() {
        let mut portal = started();
        let mut port = port();
        let surface: RenderLock<NoopRawMutex> = RenderLock::new();

        portal.inject_submission("Home Net", "p&ss");
        let report = portal.pump(&mut port, &surface);
        assert_eq!(report.accepted, 1);
        assert_eq!(
            surface.read(|s| s.get(Label::Status).to_string()),
            "Credentials received"
        );

        let credentials = portal.take_credentials().unwrap();
        assert_eq!(credentials.ssid(), "Home Net");
        assert_eq!(credentials.password(), "p&ss");
    }

    #[test]
    fn test_http_round_trip() {
        let mut portal = started();
        let mut port = port();
        let surface: RenderLock<NoopRawMutex> = RenderLock::new();
        let addr = portal.http_addr().unwrap();

        let mut client = TcpStream::connect(addr).unwrap();
        client
            .write_all(b"GET /generate_204 HTTP/1.1\r\nHost: x\r\n\r\n")
            .unwrap();

        // The connection is queued by the kernel; give accept a few tries
        let mut report = PumpReport::default();
        for _ in 0..50 {
            report = portal.pump(&mut port, &surface);
            if report.served > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(report.served, 1);

        let mut reply = String::new();
        client.read_to_string(&mut reply).unwrap();
        assert!(reply.starts_with("HTTP/1.1 302 Found\r\n"));
        assert!(reply.contains("Location: http://192.168.4.1/\r\n"));
    }

    #[test]
    fn test_slow_client_cannot_stall_pump() {
        let mut portal = started();
        let mut port = port();
        let surface: RenderLock<NoopRawMutex> = RenderLock::new();
        let addr = portal.http_addr().unwrap();

        let dripper = std::thread::spawn(move || {
            let mut client = TcpStream::connect(addr).unwrap();
            let request = b"GET /generate_204 HTTP/1.1\r\nHost: x\r\n\r\n";
            for byte in request.iter().take(20) {
                if client.write_all(&[*byte]).is_err() {
                    break;
                }
                std::thread::sleep(Duration::from_millis(30));
            }
        });

        let started_at = Instant::now();
        for _ in 0..5 {
            let pump_start = Instant::now();
            let report = portal.pump(&mut port, &surface);
            assert_eq!(report.served, 0);
            assert!(pump_start.elapsed() < Duration::from_millis(500));
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(started_at.elapsed() < Duration::from_secs(2));

        drop(portal);
        dripper.join().unwrap();
    }

    #[test]
    fn test_dns_answers_with_ap_address() {
        let mut portal = started();
        let mut port = port();
        let surface: RenderLock<NoopRawMutex> = RenderLock::new();
        let server = portal.dns_addr().unwrap();

        let client = UdpSocket::bind("127.0.0.1:0").unwrap();
        client.set_read_timeout(Some(Duration::from_secs(2))).unwrap();
        let mut query = vec![0x12, 0x34, 0x01, 0x00, 0, 1, 0, 0, 0, 0, 0, 0];
        query.extend_from_slice(b"\x07example\x03com\x00");
        query.extend_from_slice(&[0, 1, 0, 1]);
        client.send_to(&query, server).unwrap();

        for _ in 0..50 {
            if portal.pump(&mut port, &surface).served > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(10));
        }

        let mut reply = [0u8; 512];
        let (len, _) = client.recv_from(&mut reply).unwrap();
        assert_eq!(&reply[..2], &[0x12, 0x34]);
        assert_eq!(&reply[len - 4..len], &AP.octets());
    }

    #[test]
    fn test_stop_drops_sockets_and_latch() {
        let mut portal = started();
        portal.inject_submission("Home", "x");
        portal.stop();
        assert!(!portal.is_running());
        assert!(portal.http_addr().is_none());
        assert!(portal.take_credentials().is_none());
    }

    #[test]
    fn test_pump_before_start_is_idle() {
        let mut portal = TcpPortal::new(IpAddr::from([127, 0, 0, 1]));
        let mut port = port();
        let surface: RenderLock<NoopRawMutex> = RenderLock::new();
        portal.inject_submission("Home", "x");
        assert_eq!(portal.pump(&mut port, &surface), PumpReport::default());
    }
}
