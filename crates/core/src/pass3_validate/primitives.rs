//! Format validators for the extended primitives: url, socket, pubkey.

use crate::error::ValidationError;
use crate::value::PublicKey;
use std::net::{Ipv4Addr, SocketAddrV4};
use url::Url;

/// An absolute `http`/`https` URL with a non-empty host.
pub fn parse_url(raw: &str) -> Result<Url, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidUrl {
        raw: raw.to_owned(),
        reason,
    };
    let url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(invalid(format!(
            "scheme must be http or https, found '{}'",
            url.scheme()
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(invalid("missing host".to_owned()));
    }
    Ok(url)
}

/// `A.B.C.D:PORT` with every octet in 0..=255 and the port in 0..=65535.
pub fn parse_socket(raw: &str) -> Result<SocketAddrV4, ValidationError> {
    raw.parse::<SocketAddrV4>()
        .map_err(|_| ValidationError::InvalidSocket {
            raw: raw.to_owned(),
            reason: socket_reason(raw),
        })
}

fn socket_reason(raw: &str) -> String {
    let Some((ip, port)) = raw.rsplit_once(':') else {
        return "expected A.B.C.D:PORT".to_owned();
    };
    if ip.parse::<Ipv4Addr>().is_err() {
        return format!("'{}' is not an IPv4 address", ip);
    }
    if port.parse::<u16>().is_err() {
        return format!("port '{}' is not in 0..=65535", port);
    }
    "expected A.B.C.D:PORT".to_owned()
}

/// Base58 text decoding to exactly 32 bytes. With `strict`, the bytes must
/// also decompress to a point on the ed25519 curve.
pub fn parse_pubkey(raw: &str, strict: bool) -> Result<PublicKey, ValidationError> {
    let invalid = |reason: String| ValidationError::InvalidPubkey {
        raw: raw.to_owned(),
        reason,
    };
    let bytes = bs58::decode(raw)
        .into_vec()
        .map_err(|e| invalid(format!("invalid Base58: {}", e)))?;
    let bytes: [u8; PublicKey::LEN] = bytes.as_slice().try_into().map_err(|_| {
        invalid(format!(
            "decoded to {} bytes, expected {}",
            bytes.len(),
            PublicKey::LEN
        ))
    })?;
    if strict {
        ed25519_dalek::VerifyingKey::from_bytes(&bytes)
            .map_err(|_| invalid("not a valid ed25519 curve point".to_owned()))?;
    }
    Ok(PublicKey::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls() {
        assert_eq!(
            parse_url("https://api.example.com:8443/v1?x=1").unwrap().host_str(),
            Some("api.example.com")
        );
        assert!(parse_url("http://localhost").is_ok());
        for bad in ["ftp://example.com", "example.com", "/relative/path", "https://", ""] {
            assert!(
                matches!(parse_url(bad), Err(ValidationError::InvalidUrl { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn sockets() {
        let addr = parse_socket("127.0.0.1:8080").unwrap();
        assert_eq!(addr.port(), 8080);
        assert!(parse_socket("0.0.0.0:0").is_ok());
        assert!(parse_socket("255.255.255.255:65535").is_ok());
        for bad in [
            "256.1.1.1:80",
            "127.0.0.1:70000",
            "127.0.0.1",
            "localhost:80",
            "1.2.3:80",
            "[::1]:80",
            "1.2.3.4:-1",
        ] {
            assert!(
                matches!(parse_socket(bad), Err(ValidationError::InvalidSocket { .. })),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn socket_reasons_name_the_bad_part() {
        match parse_socket("127.0.0.1:70000") {
            Err(ValidationError::InvalidSocket { reason, .. }) => assert!(reason.contains("port")),
            other => panic!("unexpected {:?}", other),
        }
        match parse_socket("256.1.1.1:80") {
            Err(ValidationError::InvalidSocket { reason, .. }) => {
                assert!(reason.contains("IPv4"))
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn pubkeys() {
        let key = parse_pubkey("11111111111111111111111111111111", false).unwrap();
        assert_eq!(key.as_bytes(), &[0u8; 32]);
        assert!(matches!(
            parse_pubkey("not-base58!!", false),
            Err(ValidationError::InvalidPubkey { .. })
        ));
        // Valid Base58, wrong length.
        assert!(matches!(
            parse_pubkey("3yZe7d", false),
            Err(ValidationError::InvalidPubkey { .. })
        ));
        assert!(matches!(
            parse_pubkey("", false),
            Err(ValidationError::InvalidPubkey { .. })
        ));
    }

    #[test]
    fn strict_pubkey_accepts_real_keys() {
        let signing = ed25519_dalek::SigningKey::from_bytes(&[7u8; 32]);
        let encoded = bs58::encode(signing.verifying_key().to_bytes()).into_string();
        let key = parse_pubkey(&encoded, true).unwrap();
        assert_eq!(key.as_bytes(), &signing.verifying_key().to_bytes());
    }
}
