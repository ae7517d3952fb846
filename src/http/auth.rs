//! `Authorization: Basic admin:<token>`, compared in constant time (spec.md §1,
//! "out of scope" for the algorithmic core but required for a runnable service).

use crate::types::ServiceError;
use base64::Engine;

const SCHEME: &str = "Basic ";
const USERNAME: &str = "admin";

/// Returns `Ok(())` if `header` carries valid Basic credentials for `USERNAME`
/// matching `expected_token`. `MalformedAuth` covers a missing/unparseable
/// header (HTTP 400); `Unauthorized` covers a well-formed but wrong credential
/// (HTTP 401), per the error table in spec.md §7.
pub fn check_basic_auth(header: Option<&str>, expected_token: &str) -> Result<(), ServiceError> {
    let header = header.ok_or(ServiceError::MalformedAuth)?;
    let encoded = header.strip_prefix(SCHEME).ok_or(ServiceError::MalformedAuth)?;
    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| ServiceError::MalformedAuth)?;
    let decoded = String::from_utf8(decoded).map_err(|_| ServiceError::MalformedAuth)?;
    let (username, token) = decoded.split_once(':').ok_or(ServiceError::MalformedAuth)?;

    if username != USERNAME {
        return Err(ServiceError::Unauthorized);
    }
    if constant_time_eq(token.as_bytes(), expected_token.as_bytes()) {
        Ok(())
    } else {
        Err(ServiceError::Unauthorized)
    }
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
