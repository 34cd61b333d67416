use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::TryRngCore;
use sha2::{Digest, Sha256};

use crate::error::AnnotatifyError;

/// Number of random bytes behind each verifier.
pub const VERIFIER_BYTES: usize = 64;

pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Draw a fresh code verifier from the OS random source.
pub fn generate_verifier() -> Result<String, AnnotatifyError> {
    let mut buf = [0u8; VERIFIER_BYTES];
    OsRng
        .try_fill_bytes(&mut buf)
        .map_err(|e| AnnotatifyError::EntropyUnavailable(e.to_string()))?;
    Ok(URL_SAFE_NO_PAD.encode(buf))
}

/// S256 challenge: base64url(sha256(verifier)), unpadded.
pub fn derive_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

pub fn generate_pkce() -> Result<PkceChallenge, AnnotatifyError> {
    let code_verifier = generate_verifier()?;
    let code_challenge = derive_challenge(&code_verifier);
    Ok(PkceChallenge {
        code_verifier,
        code_challenge,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_url_safe(s: &str) -> bool {
        s.chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
    }

    #[test]
    fn verifier_encodes_64_bytes() {
        let verifier = generate_verifier().unwrap();
        // 64 bytes base64url-encoded without padding: ceil(64*4/3) = 86 chars
        assert_eq!(verifier.len(), 86);
        let raw = URL_SAFE_NO_PAD.decode(&verifier).unwrap();
        assert_eq!(raw.len(), VERIFIER_BYTES);
    }

    #[test]
    fn verifier_has_no_plus_slash_or_padding() {
        for _ in 0..32 {
            let verifier = generate_verifier().unwrap();
            assert!(!verifier.contains('+'));
            assert!(!verifier.contains('/'));
            assert!(!verifier.contains('='));
            assert!(is_url_safe(&verifier), "Invalid char in verifier: {verifier}");
        }
    }

    #[test]
    fn challenge_is_sha256_of_verifier() {
        let pkce = generate_pkce().unwrap();
        let expected = URL_SAFE_NO_PAD.encode(Sha256::digest(pkce.code_verifier.as_bytes()));
        assert_eq!(pkce.code_challenge, expected);
        assert!(is_url_safe(&pkce.code_challenge));
    }

    #[test]
    fn challenge_matches_rfc7636_vector() {
        // RFC 7636 Appendix B
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        assert_eq!(
            derive_challenge(verifier),
            "E9Melhoa2OwvFrEMTJguCHaoeK1t8URWbuGJSstw-cM"
        );
    }

    #[test]
    fn challenge_is_deterministic() {
        let verifier = generate_verifier().unwrap();
        assert_eq!(derive_challenge(&verifier), derive_challenge(&verifier));
    }

    #[test]
    fn challenge_changes_with_single_bit_flip() {
        let verifier = "dBjftJeZ4CVP-mB92K27uhbUJU1p1r_wW1gFWFOEjXk";
        let mut bytes = verifier.as_bytes().to_vec();
        // 'd' (0x64) -> 'e' (0x65)
        bytes[0] ^= 0x01;
        let flipped = String::from_utf8(bytes).unwrap();
        assert_ne!(derive_challenge(verifier), derive_challenge(&flipped));
    }

    #[test]
    fn generates_unique_values() {
        let a = generate_pkce().unwrap();
        let b = generate_pkce().unwrap();
        assert_ne!(a.code_verifier, b.code_verifier);
        assert_ne!(a.code_challenge, b.code_challenge);
    }
}
