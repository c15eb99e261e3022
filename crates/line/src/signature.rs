//! Webhook signature verification.

use {
    base64::{Engine, engine::general_purpose::STANDARD},
    hmac::{Hmac, Mac},
    sha2::Sha256,
    tracing::warn,
};

use crate::{Error, Result};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the request signature.
pub const SIGNATURE_HEADER: &str = "x-line-signature";

fn mac_for(channel_secret: &str) -> Result<HmacSha256> {
    HmacSha256::new_from_slice(channel_secret.as_bytes())
        .map_err(|e| Error::InvalidSecret(e.to_string()))
}

/// Compute the signature LINE sends for `body`: base64 of HMAC-SHA256 keyed
/// with the channel secret.
pub fn sign(body: &[u8], channel_secret: &str) -> Result<String> {
    let mut mac = mac_for(channel_secret)?;
    mac.update(body);
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Verify the `X-Line-Signature` header against the raw request body.
pub fn verify_signature(body: &[u8], signature_header: &str, channel_secret: &str) -> bool {
    let provided = match STANDARD.decode(signature_header.trim()) {
        Ok(bytes) => bytes,
        Err(_) => {
            warn!("signature header is not valid base64");
            return false;
        },
    };

    let mut mac = match mac_for(channel_secret) {
        Ok(m) => m,
        Err(e) => {
            warn!(error = %e, "cannot verify signature");
            return false;
        },
    };
    mac.update(body);

    // Constant-time comparison.
    mac.verify_slice(&provided).is_ok()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "channel_secret";
    const BODY: &[u8] = br#"{"destination":"U0","events":[]}"#;

    #[test]
    fn signed_body_verifies() {
        let signature = sign(BODY, SECRET).unwrap();
        assert!(verify_signature(BODY, &signature, SECRET));
    }

    #[test]
    fn signature_is_base64_of_32_bytes() {
        let signature = sign(b"test body", "test_secret").unwrap();
        assert_eq!(signature.len(), 44);
        assert_eq!(STANDARD.decode(&signature).unwrap().len(), 32);
    }

    #[test]
    fn wrong_secret_fails() {
        let signature = sign(BODY, "other_secret").unwrap();
        assert!(!verify_signature(BODY, &signature, SECRET));
    }

    #[test]
    fn tampered_body_fails() {
        let signature = sign(BODY, SECRET).unwrap();
        assert!(!verify_signature(
            br#"{"destination":"U0","events":[{}]}"#,
            &signature,
            SECRET
        ));
    }

    #[test]
    fn malformed_header_fails() {
        assert!(!verify_signature(BODY, "not base64 at all!", SECRET));
        assert!(!verify_signature(BODY, "", SECRET));
    }

    #[test]
    fn empty_secret_still_signs() {
        let signature = sign(BODY, "").unwrap();
        assert_eq!(signature.len(), 44);
        assert!(verify_signature(BODY, &signature, ""));
        assert!(!verify_signature(BODY, &signature, SECRET));
    }

    #[test]
    fn truncated_signature_fails() {
        let signature = sign(BODY, SECRET).unwrap();
        let short = STANDARD.encode(&STANDARD.decode(&signature).unwrap()[..16]);
        assert!(!verify_signature(BODY, &short, SECRET));
    }
}
