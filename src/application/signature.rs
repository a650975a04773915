use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Length of a hex-encoded HMAC-SHA256 digest.
const SIGNATURE_HEX_LEN: usize = 64;

fn mac(order_id: &str, payment_id: &str, shared_secret: &[u8]) -> HmacSha256 {
    let mut mac = HmacSha256::new_from_slice(shared_secret)
        .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
    mac.update(order_id.as_bytes());
    mac.update(b"|");
    mac.update(payment_id.as_bytes());
    mac
}

/// Computes the signature the gateway attaches to a completed payment:
/// lowercase hex of `HMAC-SHA256(secret, order_id + "|" + payment_id)`.
pub fn sign(order_id: &str, payment_id: &str, shared_secret: &[u8]) -> String {
    hex::encode(mac(order_id, payment_id, shared_secret).finalize().into_bytes())
}

/// Checks that a payment confirmation was signed with the shared secret.
///
/// The claimed signature must be the canonical lowercase hex form. Its shape is
/// checked first, which depends only on public input; the digest comparison
/// itself is constant-time.
pub fn verify(
    order_id: &str,
    payment_id: &str,
    claimed_signature: &str,
    shared_secret: &[u8],
) -> bool {
    let canonical = claimed_signature.len() == SIGNATURE_HEX_LEN
        && claimed_signature
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'));
    if !canonical {
        return false;
    }
    let Ok(claimed) = hex::decode(claimed_signature) else {
        return false;
    };
    mac(order_id, payment_id, shared_secret)
        .verify_slice(&claimed)
        .is_ok()
}

/// Holds the gateway's shared secret and verifies payment signatures with it.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Vec<u8>,
}

impl SignatureVerifier {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn verify(&self, order_id: &str, payment_id: &str, claimed_signature: &str) -> bool {
        verify(order_id, payment_id, claimed_signature, &self.secret)
    }
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier")
            .field("secret", &"<redacted>")
            .finish()
    }
}
