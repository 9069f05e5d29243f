//! WS-Discovery probe over UDP multicast.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::time::Duration;

use quick_xml::Reader;
use quick_xml::events::Event;
use tokio::net::UdpSocket;
use tokio::time::Instant;
use url::{Host, Url};
use uuid::Uuid;

use super::OnvifError;

/// WS-Discovery multicast group and port.
pub const MULTICAST_ADDR: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::new(239, 255, 255, 250), 3702);

const MAX_DATAGRAM: usize = 65_535;

/// A device that answered the probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    /// First advertised device service address.
    pub xaddr: String,
    /// Host part of `xaddr`.
    pub host: String,
    /// Port from `xaddr`, if it names one.
    pub port: Option<u16>,
}

/// Builds the SOAP 1.2 `Probe` for network video transmitters.
#[must_use]
pub fn probe_message(message_id: Uuid) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:a="http://schemas.xmlsoap.org/ws/2004/08/addressing" xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery" xmlns:dn="http://www.onvif.org/ver10/network/wsdl">
  <s:Header>
    <a:MessageID>uuid:{message_id}</a:MessageID>
    <a:To s:mustUnderstand="1">urn:schemas-xmlsoap-org:ws:2005:04:discovery</a:To>
    <a:Action s:mustUnderstand="1">http://schemas.xmlsoap.org/ws/2005/04/discovery/Probe</a:Action>
  </s:Header>
  <s:Body>
    <d:Probe>
      <d:Types>dn:NetworkVideoTransmitter</d:Types>
    </d:Probe>
  </s:Body>
</s:Envelope>"#
    )
}

/// Sends one probe and collects answers until `timeout` elapses.
/// Duplicate answers for the same address are dropped.
///
/// # Errors
///
/// Returns [`OnvifError::Io`] if the socket cannot be opened or the probe
/// cannot be sent.
pub async fn discover(timeout: Duration) -> Result<Vec<DiscoveredDevice>, OnvifError> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).await?;
    socket.set_multicast_ttl_v4(2)?;
    let probe = probe_message(Uuid::new_v4());
    socket.send_to(probe.as_bytes(), MULTICAST_ADDR).await?;

    let deadline = Instant::now() + timeout;
    let mut buf = vec![0_u8; MAX_DATAGRAM];
    let mut devices: Vec<DiscoveredDevice> = Vec::new();

    while let Ok(received) = tokio::time::timeout_at(deadline, socket.recv_from(&mut buf)).await {
        let (len, from) = match received {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(error = %e, "probe receive failed");
                continue;
            }
        };
        let Some(datagram) = buf.get(..len) else {
            continue;
        };
        let xml = String::from_utf8_lossy(datagram);
        match parse_probe_matches(&xml) {
            Ok(xaddrs) => {
                for xaddr in xaddrs {
                    merge_device(&mut devices, &xaddr, from);
                }
            }
            Err(e) => tracing::debug!(%from, error = %e, "ignoring unparsable probe answer"),
        }
    }
    Ok(devices)
}

fn merge_device(devices: &mut Vec<DiscoveredDevice>, xaddr: &str, from: SocketAddr) {
    if devices.iter().any(|d| d.xaddr == xaddr) {
        return;
    }
    let (host, port) = match host_from_xaddr(xaddr) {
        Ok(parts) => parts,
        Err(e) => {
            tracing::debug!(%from, error = %e, "probe answer without a usable address");
            return;
        }
    };
    devices.push(DiscoveredDevice {
        xaddr: xaddr.to_string(),
        host,
        port,
    });
}

/// Extracts the first address of every `ProbeMatch` in a probe answer.
///
/// # Errors
///
/// Returns [`OnvifError::Xml`] if the document is malformed.
pub fn parse_probe_matches(xml: &str) -> Result<Vec<String>, OnvifError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut xaddrs = Vec::new();
    let mut in_xaddrs = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => in_xaddrs = e.local_name().as_ref() == b"XAddrs",
            Ok(Event::End(_)) => in_xaddrs = false,
            Ok(Event::Text(text)) if in_xaddrs => {
                let text = text.unescape().map_err(|e| OnvifError::Xml(e.to_string()))?;
                if let Some(first) = text.split_whitespace().next() {
                    xaddrs.push(first.to_string());
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OnvifError::Xml(e.to_string())),
            Ok(_) => {}
        }
    }
    Ok(xaddrs)
}

/// Returns the host and explicit port of an `http://host[:port]/path`
/// address. IPv6 hosts are returned without brackets.
///
/// # Errors
///
/// Returns [`OnvifError::InvalidAddress`] if `xaddr` is not a URL with a
/// host.
pub fn host_from_xaddr(xaddr: &str) -> Result<(String, Option<u16>), OnvifError> {
    let url =
        Url::parse(xaddr).map_err(|e| OnvifError::InvalidAddress(format!("{xaddr}: {e}")))?;
    let host = match url.host() {
        Some(Host::Domain(domain)) => domain.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Ipv6(addr)) => addr.to_string(),
        None => return Err(OnvifError::InvalidAddress(format!("{xaddr}: no host"))),
    };
    Ok((host, url.port()))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    const PROBE_MATCHES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<SOAP-ENV:Envelope xmlns:SOAP-ENV="http://www.w3.org/2003/05/soap-envelope" xmlns:d="http://schemas.xmlsoap.org/ws/2005/04/discovery">
  <SOAP-ENV:Body>
    <d:ProbeMatches>
      <d:ProbeMatch>
        <d:Types>dn:NetworkVideoTransmitter</d:Types>
        <d:XAddrs>http://192.168.1.64/onvif/device_service http://[fe80::1]/onvif/device_service</d:XAddrs>
      </d:ProbeMatch>
      <d:ProbeMatch>
        <d:XAddrs>http://192.168.1.65:8080/onvif/device_service</d:XAddrs>
      </d:ProbeMatch>
    </d:ProbeMatches>
  </SOAP-ENV:Body>
</SOAP-ENV:Envelope>"#;

    #[test]
    fn first_xaddr_of_each_match_is_taken() {
        let Ok(xaddrs) = parse_probe_matches(PROBE_MATCHES) else {
            panic!("parse failed");
        };
        assert_eq!(
            xaddrs,
            vec![
                "http://192.168.1.64/onvif/device_service".to_string(),
                "http://192.168.1.65:8080/onvif/device_service".to_string(),
            ]
        );
    }

    #[test]
    fn malformed_answer_is_an_error() {
        assert!(parse_probe_matches("<a><b></a>").is_err());
    }

    #[test]
    fn host_and_port_are_split() {
        assert_eq!(
            host_from_xaddr("http://192.168.1.64/onvif/device_service").ok(),
            Some(("192.168.1.64".to_string(), None))
        );
        assert_eq!(
            host_from_xaddr("http://cam.local:8080/onvif/device_service").ok(),
            Some(("cam.local".to_string(), Some(8080)))
        );
        assert_eq!(
            host_from_xaddr("http://[fe80::1]:81/onvif").ok(),
            Some(("fe80::1".to_string(), Some(81)))
        );
    }

    #[test]
    fn userinfo_is_not_part_of_the_host() {
        assert_eq!(
            host_from_xaddr("http://admin@10.0.0.5/onvif/device_service").ok(),
            Some(("10.0.0.5".to_string(), None))
        );
    }

    #[test]
    fn invalid_port_or_missing_host_is_an_error() {
        assert!(matches!(
            host_from_xaddr("http://10.0.0.5:notaport/onvif"),
            Err(OnvifError::InvalidAddress(_))
        ));
        assert!(host_from_xaddr("not a url").is_err());
    }

    #[test]
    fn unusable_address_is_skipped() {
        let from = SocketAddr::from(([192, 168, 1, 64], 3702));
        let mut devices = Vec::new();
        merge_device(&mut devices, "http://10.0.0.5:notaport/onvif", from);
        assert!(devices.is_empty());
    }

    #[test]
    fn duplicate_answers_are_merged() {
        let from = SocketAddr::from(([192, 168, 1, 64], 3702));
        let mut devices = Vec::new();
        merge_device(&mut devices, "http://192.168.1.64/onvif/device_service", from);
        merge_device(&mut devices, "http://192.168.1.64/onvif/device_service", from);
        assert_eq!(devices.len(), 1);
    }

    #[test]
    fn probe_targets_video_transmitters() {
        let message = probe_message(Uuid::nil());
        assert!(message.contains("dn:NetworkVideoTransmitter"));
        assert!(message.contains("uuid:00000000-0000-0000-0000-000000000000"));
    }
}
