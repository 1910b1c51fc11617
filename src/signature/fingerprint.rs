//! Call fingerprints and the segment encoding shared with ledgers.

use std::fmt::{self, Write};

use sha2::{Digest, Sha256};

use crate::types::config::KeyEncoding;
use crate::types::ids::ComputationId;

/// Appends `text` as a length-prefixed segment (`<bytes>:<text>`).
///
/// Length prefixes keep concatenations unambiguous: two segment sequences
/// produce the same string only if they are equal piece by piece.
pub fn push_segment(buf: &mut String, text: &str) {
    // Writing to a String cannot fail.
    let _ = write!(buf, "{}:", text.len());
    buf.push_str(text);
}

/// Canonical identity of one memoized call.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Builds the fingerprint of a call.
    ///
    /// Layout: computation identity, positional count, keyword count, each
    /// positional signature in order, then each keyword name and signature.
    /// Keywords must already be ordered by name.
    pub fn build(
        id: &ComputationId,
        positional: &[String],
        keyword: &[(&str, String)],
    ) -> Self {
        let mut buf = String::new();
        push_segment(&mut buf, &id.to_string());
        push_segment(&mut buf, &positional.len().to_string());
        push_segment(&mut buf, &keyword.len().to_string());

        for signature in positional {
            push_segment(&mut buf, signature);
        }

        for (name, signature) in keyword {
            push_segment(&mut buf, name);
            push_segment(&mut buf, signature);
        }

        Self(buf)
    }

    /// Fingerprint text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Store key for this fingerprint.
    pub fn key(&self, encoding: KeyEncoding) -> String {
        match encoding {
            KeyEncoding::Raw => self.0.clone(),
            KeyEncoding::Sha256 => {
                let mut hasher = Sha256::new();
                hasher.update(self.0.as_bytes());
                hex::encode(hasher.finalize())
            }
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
