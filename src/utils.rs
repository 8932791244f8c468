use rand::{Rng, RngCore, rngs::OsRng};

const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Random alphanumeric token (ICE credentials, stream ids).
pub(crate) fn random_token(len: usize) -> String {
    (0..len)
        .map(|_| ALPHABET[OsRng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Random lowercase hex string of `bytes` bytes.
pub(crate) fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    OsRng.fill_bytes(&mut buf);
    buf.iter().map(|b| format!("{b:02x}")).collect()
}

/// SDP session ids stay below 2^62 so they survive signed 64-bit parsers.
pub(crate) fn random_session_id() -> u64 {
    OsRng.next_u64() >> 2
}

/// Port from the IANA dynamic range.
pub(crate) fn random_dynamic_port() -> u16 {
    OsRng.gen_range(49_152..=65_535)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_has_requested_length_and_alphabet() {
        let t = random_token(24);
        assert_eq!(t.len(), 24);
        assert!(t.bytes().all(|b| b.is_ascii_alphanumeric()));
    }

    #[test]
    fn hex_is_two_chars_per_byte() {
        let h = random_hex(16);
        assert_eq!(h.len(), 32);
        assert!(h.bytes().all(|b| b.is_ascii_hexdigit()));
    }

    #[test]
    fn session_id_fits_in_i64() {
        for _ in 0..64 {
            assert!(i64::try_from(random_session_id()).is_ok());
        }
    }
}
