//! ONVIF device service calls authenticated with a WS-Security
//! `UsernameToken`.

use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{SecondsFormat, Utc};
use quick_xml::Reader;
use quick_xml::events::Event;
use sha1::{Digest, Sha1};
use uuid::Uuid;

use super::OnvifError;

const GET_NETWORK_INTERFACES_ACTION: &str =
    "http://www.onvif.org/ver10/device/wsdl/GetNetworkInterfaces";

/// WS-Security credentials for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsernameToken {
    /// ONVIF user name.
    pub username: String,
    /// `base64(sha1(nonce + created + password))`.
    pub password_digest: String,
    /// Base64 of the raw nonce.
    pub nonce: String,
    /// Creation time, RFC 3339 UTC.
    pub created: String,
}

impl UsernameToken {
    /// Builds a token from an explicit nonce and creation time.
    #[must_use]
    pub fn with_nonce(username: &str, password: &str, nonce: &[u8], created: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(nonce);
        hasher.update(created.as_bytes());
        hasher.update(password.as_bytes());
        Self {
            username: username.to_string(),
            password_digest: STANDARD.encode(hasher.finalize()),
            nonce: STANDARD.encode(nonce),
            created: created.to_string(),
        }
    }

    /// Builds a token with a fresh random nonce stamped now.
    #[must_use]
    pub fn generate(username: &str, password: &str) -> Self {
        let nonce = Uuid::new_v4();
        let created = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        Self::with_nonce(username, password, nonce.as_bytes(), &created)
    }

    fn security_header(&self) -> String {
        format!(
            r#"<wsse:Security s:mustUnderstand="1" xmlns:wsse="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-secext-1.0.xsd" xmlns:wsu="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-wssecurity-utility-1.0.xsd">
      <wsse:UsernameToken>
        <wsse:Username>{}</wsse:Username>
        <wsse:Password Type="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-username-token-profile-1.0#PasswordDigest">{}</wsse:Password>
        <wsse:Nonce EncodingType="http://docs.oasis-open.org/wss/2004/01/oasis-200401-wss-soap-message-security-1.0#Base64Binary">{}</wsse:Nonce>
        <wsu:Created>{}</wsu:Created>
      </wsse:UsernameToken>
    </wsse:Security>"#,
            quick_xml::escape::escape(self.username.as_str()),
            self.password_digest,
            self.nonce,
            self.created
        )
    }
}

/// Builds the `GetNetworkInterfaces` request envelope.
#[must_use]
pub fn get_network_interfaces_request(token: &UsernameToken) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<s:Envelope xmlns:s="http://www.w3.org/2003/05/soap-envelope" xmlns:tds="http://www.onvif.org/ver10/device/wsdl">
  <s:Header>
    {}
  </s:Header>
  <s:Body>
    <tds:GetNetworkInterfaces/>
  </s:Body>
</s:Envelope>"#,
        token.security_header()
    )
}

/// Collects every `HwAddress` in a `GetNetworkInterfacesResponse`.
///
/// # Errors
///
/// Returns [`OnvifError::Fault`] if the document is a SOAP fault, or
/// [`OnvifError::Xml`] if it is malformed.
pub fn parse_hw_addresses(xml: &str) -> Result<Vec<String>, OnvifError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut addresses = Vec::new();
    let mut current: Option<Vec<u8>> = None;
    let mut fault: Option<String> = None;
    let mut is_fault = false;
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = e.local_name().as_ref().to_vec();
                if name == b"Fault" {
                    is_fault = true;
                }
                current = Some(name);
            }
            Ok(Event::End(_)) => current = None,
            Ok(Event::Text(text)) => {
                let text = text.unescape().map_err(|e| OnvifError::Xml(e.to_string()))?;
                match current.as_deref() {
                    Some(b"HwAddress") => addresses.push(text.trim().to_string()),
                    Some(b"Text") if is_fault && fault.is_none() => {
                        fault = Some(text.trim().to_string());
                    }
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(OnvifError::Xml(e.to_string())),
            Ok(_) => {}
        }
    }

    if is_fault {
        return Err(OnvifError::Fault(
            fault.unwrap_or_else(|| "unspecified SOAP fault".to_string()),
        ));
    }
    Ok(addresses)
}

/// Compares two MAC addresses ignoring case and `-`/`:` separators.
#[must_use]
pub fn mac_matches(a: &str, b: &str) -> bool {
    let normalize = |mac: &str| -> String {
        mac.trim()
            .chars()
            .map(|c| if c == '-' { ':' } else { c.to_ascii_lowercase() })
            .collect()
    };
    normalize(a) == normalize(b)
}

/// HTTP client for the device service.
#[derive(Debug, Clone)]
pub struct DeviceClient {
    http: reqwest::Client,
    username: String,
    password: String,
}

impl DeviceClient {
    /// Creates a client with the given credentials and request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`OnvifError::Http`] if the HTTP client cannot be built.
    pub fn new(username: &str, password: &str, timeout: Duration) -> Result<Self, OnvifError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            username: username.to_string(),
            password: password.to_string(),
        })
    }

    /// Device service URL for `host` and `port`.
    #[must_use]
    pub fn device_service_url(host: &str, port: u16) -> String {
        if host.contains(':') {
            format!("http://[{host}]:{port}/onvif/device_service")
        } else {
            format!("http://{host}:{port}/onvif/device_service")
        }
    }

    /// Returns the hardware addresses of every network interface on the
    /// device.
    ///
    /// # Errors
    ///
    /// Returns [`OnvifError::Http`] on transport failure, or
    /// [`OnvifError::Fault`] if the device rejects the request.
    pub async fn network_interfaces(
        &self,
        host: &str,
        port: u16,
    ) -> Result<Vec<String>, OnvifError> {
        let token = UsernameToken::generate(&self.username, &self.password);
        let response = self
            .http
            .post(Self::device_service_url(host, port))
            .header(
                reqwest::header::CONTENT_TYPE,
                format!(
                    r#"application/soap+xml; charset=utf-8; action="{GET_NETWORK_INTERFACES_ACTION}""#
                ),
            )
            .body(get_network_interfaces_request(&token))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        match parse_hw_addresses(&body) {
            Ok(addresses) if status.is_success() => Ok(addresses),
            Ok(_) => Err(OnvifError::Fault(format!("device answered {status}"))),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn password_digest_follows_username_token_profile() {
        let nonce: Vec<u8> = (0_u8..16).collect();
        let token =
            UsernameToken::with_nonce("admin", "secret", &nonce, "2024-05-01T10:00:00.000Z");
        assert_eq!(token.password_digest, "tgH7nNKInrQ+jPH3+wLkoXfGz4w=");
        assert_eq!(token.nonce, "AAECAwQFBgcICQoLDA0ODw==");
    }

    #[test]
    fn request_carries_the_token() {
        let token = UsernameToken::with_nonce("a<b", "pw", b"nonce", "2024-05-01T10:00:00Z");
        let request = get_network_interfaces_request(&token);
        assert!(request.contains("<wsse:Username>a&lt;b</wsse:Username>"));
        assert!(request.contains(&token.password_digest));
        assert!(request.contains("<tds:GetNetworkInterfaces/>"));
    }

    #[test]
    fn hw_addresses_are_collected() {
        let xml = r#"<?xml version="1.0"?>
<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope" xmlns:tds="http://www.onvif.org/ver10/device/wsdl" xmlns:tt="http://www.onvif.org/ver10/schema">
  <env:Body>
    <tds:GetNetworkInterfacesResponse>
      <tds:NetworkInterfaces token="eth0">
        <tt:Enabled>true</tt:Enabled>
        <tt:Info>
          <tt:Name>eth0</tt:Name>
          <tt:HwAddress>C0:39:5A:F5:74:A3</tt:HwAddress>
          <tt:MTU>1500</tt:MTU>
        </tt:Info>
      </tds:NetworkInterfaces>
    </tds:GetNetworkInterfacesResponse>
  </env:Body>
</env:Envelope>"#;
        let Ok(addresses) = parse_hw_addresses(xml) else {
            panic!("parse failed");
        };
        assert_eq!(addresses, vec!["C0:39:5A:F5:74:A3".to_string()]);
    }

    #[test]
    fn soap_fault_is_reported() {
        let xml = r#"<env:Envelope xmlns:env="http://www.w3.org/2003/05/soap-envelope">
  <env:Body>
    <env:Fault>
      <env:Code><env:Value>env:Sender</env:Value></env:Code>
      <env:Reason><env:Text xml:lang="en">Sender not Authorized</env:Text></env:Reason>
    </env:Fault>
  </env:Body>
</env:Envelope>"#;
        let Err(OnvifError::Fault(reason)) = parse_hw_addresses(xml) else {
            panic!("fault not detected");
        };
        assert_eq!(reason, "Sender not Authorized");
    }

    #[test]
    fn mac_comparison_ignores_case_and_separator() {
        assert!(mac_matches("C0:39:5A:F5:74:A3", "c0:39:5a:f5:74:a3"));
        assert!(mac_matches("c0-39-5a-f5-74-a3", "C0:39:5A:F5:74:A3"));
        assert!(!mac_matches("c0:39:5a:f5:74:a4", "c0:39:5a:f5:74:a3"));
    }

    #[test]
    fn ipv6_hosts_are_bracketed() {
        assert_eq!(
            DeviceClient::device_service_url("fe80::1", 80),
            "http://[fe80::1]:80/onvif/device_service"
        );
        assert_eq!(
            DeviceClient::device_service_url("192.168.1.64", 8080),
            "http://192.168.1.64:8080/onvif/device_service"
        );
    }
}
