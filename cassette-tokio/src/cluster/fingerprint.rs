use md5::{Digest, Md5};
use std::fmt;

use cassette_protocol::frame::HEADER_LEN;

/// Cluster-wide identifier of a logical prepared statement: a 128-bit digest
/// of the encoded `PREPARE` request. Every host that acknowledges the prepare
/// is recorded under the same fingerprint, which is what lets the session
/// route an `EXECUTE` only to hosts that will accept it.
///
/// Only the envelope body participates in the digest. Headers carry the
/// per-envelope stream id, and the fingerprint must be a stable function of
/// the statement across envelopes and process restarts. MD5 is deliberate:
/// the key is not adversarial, and Cassandra itself derives prepared ids from
/// an MD5 of the statement.
#[derive(Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Hash)]
pub struct Fingerprint([u8; 16]);

impl Fingerprint {
    /// Fingerprint of an encoded `PREPARE` envelope.
    pub fn of_prepare(encoded: &[u8]) -> Fingerprint {
        let body = encoded.get(HEADER_LEN..).unwrap_or_default();
        Fingerprint(Md5::digest(body).into())
    }

    #[inline]
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cassette_protocol::frame::{Envelope, Flags, Version};

    fn encoded_prepare(query: &str) -> Vec<u8> {
        Envelope::new_req_prepare(query.into(), Flags::empty(), Version::V4)
            .encode()
            .unwrap()
    }

    #[test]
    fn same_statement_same_fingerprint() {
        // two envelopes for the same text differ in stream id, but the
        // fingerprint must not see that
        let first = encoded_prepare("SELECT * FROM t WHERE k = ?");
        let second = encoded_prepare("SELECT * FROM t WHERE k = ?");
        assert_ne!(first, second);

        assert_eq!(
            Fingerprint::of_prepare(&first),
            Fingerprint::of_prepare(&second)
        );
    }

    #[test]
    fn different_statements_differ() {
        let first = Fingerprint::of_prepare(&encoded_prepare("SELECT a FROM t"));
        let second = Fingerprint::of_prepare(&encoded_prepare("SELECT b FROM t"));
        assert_ne!(first, second);
    }

    #[test]
    fn displays_as_hex() {
        let fingerprint = Fingerprint::of_prepare(&encoded_prepare("SELECT 1"));
        let text = fingerprint.to_string();
        assert_eq!(text.len(), 32);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
