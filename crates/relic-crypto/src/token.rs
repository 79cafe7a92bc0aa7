use relic_types::{LegacyTimestamp, TypeError};

use crate::hasher::{ContentHasher, DigestAlgorithm};

/// Derive the synthetic state token for a datastream version.
///
/// The legacy format has no change-detection token, so one is derived from
/// the version's creation timestamp: the uppercase hex MD5 of the timestamp's
/// epoch milliseconds rendered as a decimal string.
pub fn state_token(created: &str) -> Result<String, TypeError> {
    let millis = LegacyTimestamp::parse(created)?.epoch_millis();
    Ok(ContentHasher::digest_hex(DigestAlgorithm::Md5, millis.to_string().as_bytes())
        .to_ascii_uppercase())
}
