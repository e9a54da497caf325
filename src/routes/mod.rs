/// Router Module Index
///
/// Splits the routing surface along the authentication boundary so access
/// control is applied explicitly at the module level (via Axum layers) and a
/// protected endpoint cannot be exposed by accident.

/// Routes accessible to all visitors (read-only). Handlers enforce the
/// publication visibility rules at the repository level.
pub mod public;

/// Routes behind the `AuthUser` extractor layer. Unauthenticated requests
/// are redirected to the login page before reaching a handler.
pub mod authenticated;
