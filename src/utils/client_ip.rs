// ABOUTME: Best-effort client IP extraction from reverse-proxy headers
// ABOUTME: Used to key login lockouts; falls back to a fixed sentinel when nothing is available

use http::HeaderMap;
use kartuli_core::constants::auth::UNKNOWN_CLIENT_IP;

/// Extract the client IP for lockout bookkeeping
///
/// Priority: `X-Forwarded-For` (first hop) > `X-Real-IP` > `"unknown"`.
/// Values are not validated as IP addresses; the string only needs to be a
/// stable key for the same client.
#[must_use]
pub fn extract_client_ip(headers: &HeaderMap) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|xff| xff.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());

    let real_ip = || {
        headers
            .get("x-real-ip")
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
    };

    forwarded
        .or_else(real_ip)
        .unwrap_or(UNKNOWN_CLIENT_IP)
        .to_owned()
}
