#![deny(unsafe_code)]

use sha2::Digest;

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = sha2::Sha256::digest(bytes);
    hex::encode(digest)
}

/// Digest over the manifest's `(path, sha256)` pins, in path order.
pub fn fingerprint<'a>(pins: impl IntoIterator<Item = (&'a str, &'a str)>) -> String {
    let mut hasher = sha2::Sha256::new();
    for (path, sha256) in pins {
        hasher.update(path.as_bytes());
        hasher.update(b":");
        hasher.update(sha256.as_bytes());
        hasher.update(b"\n");
    }
    hex::encode(hasher.finalize())
}
