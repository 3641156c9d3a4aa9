//! Bearer token authentication gate.
//!
//! Decides, from a request path and its `Authorization` header, whether the
//! request may proceed and who the caller is:
//!
//! 1. Paths under an excluded prefix pass without a credential.
//! 2. A missing or empty header is rejected.
//! 3. A leading `Bearer ` is stripped. Without it the header value is taken
//!    as the token verbatim.
//! 4. The token must declare an HMAC algorithm (HS256/HS384/HS512) and carry
//!    a valid signature under the signing secret. `exp` and `nbf` are
//!    enforced when present.
//! 5. The claims must carry an `id` claim, which becomes the caller identity.

use std::collections::HashSet;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use serde_json::Value;

use crate::claims::{Claims, SubjectId};
use crate::error::AuthError;
use crate::exclusion::ExclusionList;
use crate::secret::SigningSecret;

const BEARER_PREFIX: &str = "Bearer ";

/// Result of a request that passed the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// The path is exempt; no identity was established.
    Excluded,
    /// The token verified and identified this caller.
    Authenticated(SubjectId),
}

/// Verifies bearer tokens against a shared HMAC secret.
///
/// Holds only immutable configuration, so one instance serves every request.
#[derive(Debug, Clone)]
pub struct Authenticator {
    secret: SigningSecret,
    exclusions: ExclusionList,
    leeway_secs: u64,
}

impl Authenticator {
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            secret,
            exclusions: ExclusionList::default(),
            leeway_secs: 0,
        }
    }

    /// Replace the set of path prefixes that skip authentication.
    pub fn with_exclusions(mut self, exclusions: ExclusionList) -> Self {
        self.exclusions = exclusions;
        self
    }

    /// Clock skew tolerated when checking `exp` and `nbf`.
    pub fn with_leeway(mut self, leeway_secs: u64) -> Self {
        self.leeway_secs = leeway_secs;
        self
    }

    pub fn exclusions(&self) -> &ExclusionList {
        &self.exclusions
    }

    /// Run the gate for one request.
    pub fn authenticate(
        &self,
        path: &str,
        authorization: Option<&str>,
    ) -> Result<AuthOutcome, AuthError> {
        if self.exclusions.is_excluded(path) {
            return Ok(AuthOutcome::Excluded);
        }

        let header = match authorization {
            Some(value) if !value.is_empty() => value,
            _ => return Err(AuthError::MissingToken),
        };

        let claims = self.verify(strip_bearer(header))?;
        let subject = claims.subject().ok_or(AuthError::Unauthorized)?;

        Ok(AuthOutcome::Authenticated(subject))
    }

    /// Verify a raw token and return its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        let algorithm = declared_algorithm(token)?;

        let data = decode::<Value>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &self.validation(algorithm),
        )
        .map_err(|err| {
            tracing::debug!(error = %err, "bearer token failed verification");
            AuthError::InvalidOrExpiredToken
        })?;

        match data.claims {
            Value::Object(claims) => Ok(Claims::new(claims)),
            _ => Err(AuthError::Unauthorized),
        }
    }

    fn validation(&self, algorithm: Algorithm) -> Validation {
        let mut validation = Validation::new(algorithm);
        // Registered claims are checked when present but none is mandatory.
        validation.required_spec_claims = HashSet::new();
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.validate_aud = false;
        validation.leeway = self.leeway_secs;
        validation
    }
}

/// Strip the `Bearer ` scheme. A header without it is returned unchanged.
pub fn strip_bearer(header: &str) -> &str {
    header.strip_prefix(BEARER_PREFIX).unwrap_or(header)
}

#[derive(Deserialize)]
struct RawHeader {
    alg: String,
}

/// Read the algorithm a compact token declares, allowing only the HMAC family.
///
/// Known asymmetric algorithms and `none` are reported as unsupported. A
/// header that does not parse, including one naming an algorithm that does
/// not exist, is an invalid token.
fn declared_algorithm(token: &str) -> Result<Algorithm, AuthError> {
    let header = match decode_header(token) {
        Ok(header) => header,
        Err(_) if declares_none(token) => {
            tracing::warn!(alg = "none", "rejected unsigned token");
            return Err(AuthError::UnsupportedSigningMethod("none".to_string()));
        }
        Err(err) => {
            tracing::debug!(error = %err, "bearer token header did not parse");
            return Err(AuthError::InvalidOrExpiredToken);
        }
    };

    match header.alg {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(header.alg),
        other => {
            let alg = format!("{other:?}");
            tracing::warn!(alg = %alg, "rejected token with non-HMAC signing method");
            Err(AuthError::UnsupportedSigningMethod(alg))
        }
    }
}

/// `none` has no [`Algorithm`] variant, so it is read from the raw header.
fn declares_none(token: &str) -> bool {
    token
        .split('.')
        .next()
        .and_then(|segment| URL_SAFE_NO_PAD.decode(segment).ok())
        .and_then(|bytes| serde_json::from_slice::<RawHeader>(&bytes).ok())
        .is_some_and(|header| header.alg == "none")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use hmac::{Hmac, Mac};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use sha2::Sha256;

    const SECRET: &str = "test-signing-secret";

    fn authenticator() -> Authenticator {
        Authenticator::new(SigningSecret::new(SECRET).unwrap()).with_exclusions(
            ExclusionList::new(["/signup", "/login", "/google/login", "/google/callback"]),
        )
    }

    fn sign(alg: Algorithm, claims: Value, secret: &str) -> String {
        encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn valid_token(id: &str) -> String {
        let exp = Utc::now().timestamp() + 3600;
        sign(Algorithm::HS256, json!({ "id": id, "exp": exp }), SECRET)
    }

    /// Build a compact token with an arbitrary header, HMAC-SHA256 signed
    /// with the real secret, as an algorithm-confusion attacker would.
    fn forge(header: Value, claims: Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&header).unwrap());
        let payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&claims).unwrap());
        let message = format!("{header}.{payload}");
        let mut mac = Hmac::<Sha256>::new_from_slice(SECRET.as_bytes()).unwrap();
        mac.update(message.as_bytes());
        let signature = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());
        format!("{message}.{signature}")
    }

    fn bearer(token: &str) -> String {
        format!("Bearer {token}")
    }

    #[test]
    fn test_excluded_path_needs_no_header() {
        let gate = authenticator();
        for path in ["/signup", "/login", "/google/login", "/google/callback"] {
            assert_eq!(gate.authenticate(path, None), Ok(AuthOutcome::Excluded));
        }
    }

    #[test]
    fn test_excluded_path_ignores_bad_header() {
        let gate = authenticator();
        assert_eq!(
            gate.authenticate("/login", Some("Bearer garbage")),
            Ok(AuthOutcome::Excluded)
        );
    }

    #[test]
    fn test_missing_header() {
        let gate = authenticator();
        assert_eq!(gate.authenticate("/me", None), Err(AuthError::MissingToken));
        assert_eq!(gate.authenticate("/me", Some("")), Err(AuthError::MissingToken));
    }

    #[test]
    fn test_valid_token_yields_identity() {
        let gate = authenticator();
        let header = bearer(&valid_token("user-7"));
        assert_eq!(
            gate.authenticate("/me", Some(&header)),
            Ok(AuthOutcome::Authenticated(SubjectId::new("user-7")))
        );
    }

    #[test]
    fn test_hs384_and_hs512_accepted() {
        let gate = authenticator();
        for alg in [Algorithm::HS384, Algorithm::HS512] {
            let token = sign(alg, json!({ "id": 9 }), SECRET);
            assert_eq!(
                gate.authenticate("/me", Some(&bearer(&token))),
                Ok(AuthOutcome::Authenticated(SubjectId::new("9")))
            );
        }
    }

    #[test]
    fn test_token_without_bearer_prefix_accepted() {
        let gate = authenticator();
        let token = valid_token("user-7");
        assert_eq!(
            gate.authenticate("/me", Some(&token)),
            Ok(AuthOutcome::Authenticated(SubjectId::new("user-7")))
        );
    }

    #[test]
    fn test_lowercase_scheme_is_not_stripped() {
        let gate = authenticator();
        let header = format!("bearer {}", valid_token("user-7"));
        assert_eq!(
            gate.authenticate("/me", Some(&header)),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_bare_scheme_is_invalid() {
        let gate = authenticator();
        assert_eq!(
            gate.authenticate("/me", Some("Bearer ")),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_non_hmac_algorithms_rejected_regardless_of_claims() {
        let gate = authenticator();
        for alg in ["RS256", "RS384", "RS512", "ES256", "ES384", "PS256", "PS512", "EdDSA", "none"] {
            let token = forge(
                json!({ "alg": alg, "typ": "JWT" }),
                json!({ "id": "admin", "exp": Utc::now().timestamp() + 3600 }),
            );
            assert_eq!(
                gate.authenticate("/me", Some(&bearer(&token))),
                Err(AuthError::UnsupportedSigningMethod(alg.to_string())),
                "alg {alg}"
            );
        }
    }

    #[test]
    fn test_unknown_algorithm_is_invalid() {
        let gate = authenticator();
        for alg in ["HS1024", "IS256", "XS256", "hs256", ""] {
            let token = forge(
                json!({ "alg": alg, "typ": "JWT" }),
                json!({ "id": "admin", "exp": Utc::now().timestamp() + 3600 }),
            );
            assert_eq!(
                gate.authenticate("/me", Some(&bearer(&token))),
                Err(AuthError::InvalidOrExpiredToken),
                "alg {alg:?}"
            );
        }
    }

    #[test]
    fn test_forged_hs256_header_still_verifies() {
        // Sanity check for the forge helper: the same construction with an
        // HMAC header passes, so the rejections above come from the algorithm.
        let gate = authenticator();
        let token = forge(json!({ "alg": "HS256", "typ": "JWT" }), json!({ "id": "admin" }));
        assert_eq!(
            gate.authenticate("/me", Some(&bearer(&token))),
            Ok(AuthOutcome::Authenticated(SubjectId::new("admin")))
        );
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let gate = authenticator();
        let token = sign(Algorithm::HS256, json!({ "id": "user-7" }), "another-secret");
        assert_eq!(
            gate.authenticate("/me", Some(&bearer(&token))),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_single_bit_corruption_rejected() {
        let gate = authenticator();
        let token = valid_token("user-7");
        let parts: Vec<&str> = token.split('.').collect();

        // Flip every bit of the header, the payload and the signature in turn.
        for segment in [0usize, 1, 2] {
            let original = URL_SAFE_NO_PAD.decode(parts[segment]).unwrap();
            for byte in 0..original.len() {
                for bit in 0..8 {
                    let mut corrupted = original.clone();
                    corrupted[byte] ^= 1 << bit;
                    let mut pieces: Vec<String> = parts.iter().map(|p| p.to_string()).collect();
                    pieces[segment] = URL_SAFE_NO_PAD.encode(&corrupted);
                    let tampered = pieces.join(".");

                    assert_eq!(
                        gate.authenticate("/me", Some(&bearer(&tampered))),
                        Err(AuthError::InvalidOrExpiredToken),
                        "segment {segment} byte {byte} bit {bit}"
                    );
                }
            }
        }
    }

    #[test]
    fn test_malformed_structure_rejected() {
        let gate = authenticator();
        for token in ["abc", "a.b", "a.b.c.d", "!!!.@@@.###", "e30.e30"] {
            assert_eq!(
                gate.authenticate("/me", Some(&bearer(token))),
                Err(AuthError::InvalidOrExpiredToken),
                "token {token}"
            );
        }
    }

    #[test]
    fn test_expired_token_rejected() {
        let gate = authenticator();
        let exp = Utc::now().timestamp() - 120;
        let token = sign(Algorithm::HS256, json!({ "id": "user-7", "exp": exp }), SECRET);
        assert_eq!(
            gate.authenticate("/me", Some(&bearer(&token))),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_leeway_tolerates_recent_expiry() {
        let gate = authenticator().with_leeway(300);
        let exp = Utc::now().timestamp() - 120;
        let token = sign(Algorithm::HS256, json!({ "id": "user-7", "exp": exp }), SECRET);
        assert!(gate.authenticate("/me", Some(&bearer(&token))).is_ok());
    }

    #[test]
    fn test_not_yet_valid_token_rejected() {
        let gate = authenticator();
        let nbf = Utc::now().timestamp() + 3600;
        let token = sign(Algorithm::HS256, json!({ "id": "user-7", "nbf": nbf }), SECRET);
        assert_eq!(
            gate.authenticate("/me", Some(&bearer(&token))),
            Err(AuthError::InvalidOrExpiredToken)
        );
    }

    #[test]
    fn test_token_without_expiry_accepted() {
        let gate = authenticator();
        let token = sign(Algorithm::HS256, json!({ "id": "user-7" }), SECRET);
        assert!(gate.authenticate("/me", Some(&bearer(&token))).is_ok());
    }

    #[test]
    fn test_token_without_subject_is_unauthorized() {
        let gate = authenticator();
        let token = sign(Algorithm::HS256, json!({ "sub": "user-7" }), SECRET);
        assert_eq!(
            gate.authenticate("/me", Some(&bearer(&token))),
            Err(AuthError::Unauthorized)
        );
    }

    #[test]
    fn test_verify_returns_all_claims() {
        let gate = authenticator();
        let token = sign(
            Algorithm::HS256,
            json!({ "id": "user-7", "role": "member" }),
            SECRET,
        );
        let claims = gate.verify(&token).unwrap();
        assert_eq!(claims.get("role"), Some(&json!("member")));
    }

    #[test]
    fn test_strip_bearer() {
        assert_eq!(strip_bearer("Bearer abc"), "abc");
        assert_eq!(strip_bearer("abc"), "abc");
        assert_eq!(strip_bearer("Basic abc"), "Basic abc");
    }
}
