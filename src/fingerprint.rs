use sha2::{Digest, Sha256};

/// Compute the content fingerprint for a file's bytes.
///
/// Text content is normalized before hashing so the same file fingerprints
/// identically on Windows and Unix checkouts: `\r\n` and bare `\r` become
/// `\n`, and leading/trailing whitespace is stripped. Binary content (anything
/// that is not valid UTF-8) is hashed as-is.
pub fn content_fingerprint(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => {
            let normalized = text.replace("\r\n", "\n").replace('\r', "\n");
            hash_hex(normalized.trim().as_bytes())
        }
        Err(_) => hash_hex(bytes),
    }
}

fn hash_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}
