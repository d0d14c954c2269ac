// Copyright 2025 New Vector Ltd.
//
// SPDX-License-Identifier: AGPL-3.0-only OR LicenseRef-Element-Commercial
// Please see LICENSE files in the repository root for full details.

//! [PKCE] material for one login attempt.
//!
//! The random values are drawn from a generator bounded by [`CryptoRng`], so
//! a predictable source cannot be plugged in by mistake.
//!
//! [PKCE]: https://www.rfc-editor.org/rfc/rfc7636

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{CryptoRng, Rng};
use sha2::{Digest, Sha256};

/// Number of random bytes in the `state` parameter.
pub const STATE_LENGTH: usize = 28;

/// Number of random bytes in the code verifier.
pub const CODE_VERIFIER_LENGTH: usize = 32;

/// The only code challenge method used by this client.
pub const CODE_CHALLENGE_METHOD: &str = "S256";

fn random_hex<const N: usize>(rng: &mut (impl Rng + CryptoRng)) -> String {
    let mut bytes = [0u8; N];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Generate the anti-forgery `state` nonce, as lowercase hex.
#[must_use]
pub fn generate_state(rng: &mut (impl Rng + CryptoRng)) -> String {
    random_hex::<STATE_LENGTH>(rng)
}

/// Generate the PKCE code verifier, as lowercase hex.
#[must_use]
pub fn generate_code_verifier(rng: &mut (impl Rng + CryptoRng)) -> String {
    random_hex::<CODE_VERIFIER_LENGTH>(rng)
}

/// Compute the S256 code challenge of a verifier: the SHA-256 digest of its
/// UTF-8 bytes, base64url-encoded without padding.
#[must_use]
pub fn compute_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    Base64UrlUnpadded::encode_string(&hash)
}

/// The PKCE material of a login attempt.
#[derive(Clone, PartialEq, Eq)]
pub struct PkceState {
    /// The anti-forgery nonce roundtripped through the provider.
    pub state: String,

    /// The secret sent at the token endpoint.
    pub code_verifier: String,

    /// The challenge derived from the verifier, sent at the authorize
    /// endpoint.
    pub code_challenge: String,
}

impl PkceState {
    /// Generate a fresh state, verifier and challenge.
    #[must_use]
    pub fn generate(rng: &mut (impl Rng + CryptoRng)) -> Self {
        let state = generate_state(rng);
        let code_verifier = generate_code_verifier(rng);
        let code_challenge = compute_code_challenge(&code_verifier);

        Self {
            state,
            code_verifier,
            code_challenge,
        }
    }
}

impl std::fmt::Debug for PkceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PkceState")
            .field("state", &self.state)
            .field("code_challenge", &self.code_challenge)
            .finish_non_exhaustive()
    }
}
