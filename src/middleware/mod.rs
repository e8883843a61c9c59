// ABOUTME: HTTP middleware for admin session checks, CSRF validation and request tracing
// ABOUTME: axum from_fn middleware that runs before protected admin handlers

/// Admin session cookie verification
pub mod admin_session;
/// Double-submit CSRF validation
pub mod csrf;
/// Request spans and security headers
pub mod tracing;

pub use admin_session::{require_admin_session, AdminSession};
pub use csrf::{require_csrf, requires_csrf_validation};
pub use self::tracing::{apply_security_headers, create_request_span};
