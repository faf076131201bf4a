//! Role-based authorization gate.

use mercado_core::models::user::Role;

use crate::error::AuthError;
use crate::token::SessionClaims;

/// Allow the caller only if the verified claims carry exactly the
/// required role. There is no role hierarchy — two levels, exact match.
pub fn require_role(claims: &SessionClaims, required: Role) -> Result<(), AuthError> {
    if claims.role == required {
        Ok(())
    } else {
        Err(AuthError::InsufficientRole { required })
    }
}
