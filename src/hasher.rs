/// Content digests for navtree sources.
use sha2::{Digest as _, Sha256};

use crate::types::SourceDigest;

/// SHA-256 of a navtree file's raw text.
///
/// Line endings are normalized to `\n` first so a checkout on another
/// platform does not flag every source as stale.
pub fn digest(content: &str) -> SourceDigest {
    let normalized = content.replace("\r\n", "\n");
    let hash = Sha256::digest(normalized.as_bytes());
    return SourceDigest(format!("{hash:x}"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn digest_is_lowercase_hex_and_ignores_crlf() {
        let unix = digest("var a =\n[];\n");
        let windows = digest("var a =\r\n[];\r\n");
        assert_eq!(unix, windows);
        assert_eq!(unix.0.len(), 64);
        assert!(unix.0.chars().all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
        assert_ne!(unix, digest("var b =\n[];\n"));
    }
}
