//! Lightweight scrambling for distributed table files.
//!
//! A scrambled file starts with [`SIGNATURE`] followed by the payload XORed
//! against a byte keystream. The keystream does not depend on the payload,
//! so [`encrypt`] and [`decrypt`] are the same transform.
//!
//! This is a format of this crate only. It does not read the scrambled
//! tables shipped with the retail game, whose signatures are not recognized
//! and pass through as plain bytes.

/// Marker at the start of a scrambled file.
pub const SIGNATURE: [u8; 4] = [0xCA, 0xCA, 0xCA, 0xCA];

/// Bytes inspected when sniffing for the signature.
pub const SNIFF_LEN: usize = 10;

const KEY_SEED: u8 = 0x5A;

/// Whether `bytes` starts with the scrambling signature.
pub fn is_encrypted(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(SNIFF_LEN)];
    head.starts_with(&SIGNATURE)
}

/// Unscrambles a signed payload. Unsigned input is returned unchanged.
pub fn decrypt(bytes: &[u8]) -> Vec<u8> {
    match bytes.strip_prefix(&SIGNATURE) {
        Some(payload) => apply_keystream(payload),
        None => bytes.to_vec(),
    }
}

/// Scrambles `plain` and prepends the signature.
pub fn encrypt(plain: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(plain.len() + SIGNATURE.len());
    out.extend_from_slice(&SIGNATURE);
    out.extend(apply_keystream(plain));
    out
}

fn apply_keystream(data: &[u8]) -> Vec<u8> {
    let mut key = KEY_SEED;
    data.iter()
        .map(|&byte| {
            let out = byte ^ key;
            key = key.rotate_left(3).wrapping_add(0x2B);
            out
        })
        .collect()
}
