use serde::{Deserialize, Serialize};

/// Millisatoshis per satoshi.
pub const MSAT_PER_SAT: u64 = 1000;

/// One persisted payment, stored as a single JSON line in its key's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub lnurlp_id: String,
    /// Amount in sat.
    pub amount: u64,
    pub comment: String,
}

impl PaymentRecord {
    pub fn new(lnurlp_id: impl Into<String>, amount: u64, comment: impl Into<String>) -> Self {
        Self {
            lnurlp_id: lnurlp_id.into(),
            amount,
            comment: comment.into(),
        }
    }
}

/// Truncating msat -> sat conversion.
pub fn msat_to_sat(amount_msat: u64) -> u64 {
    amount_msat / MSAT_PER_SAT
}

/// Longest accepted key; `payments_<key>.txt` must fit a 255-byte file name.
pub const MAX_KEY_LEN: usize = 128;

/// Keys end up in file names, so only `[A-Za-z0-9_-]` is accepted.
pub fn is_valid_key(key: &str) -> bool {
    (1..=MAX_KEY_LEN).contains(&key.len())
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}
