//! Tenant and actor context passed explicitly to every ledger operation.

use serde::{Deserialize, Serialize};

use crate::types::{CompanyId, UserId};

/// The tenant and acting user a call is made on behalf of.
///
/// Identity resolution happens upstream; by the time a movement producer or
/// the closing trigger calls into the ledger, the company has already been
/// authorised for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TenantContext {
    /// Company every read and write is scoped to.
    pub company_id: CompanyId,
    /// User performing the operation.
    pub user_id: UserId,
}

impl TenantContext {
    /// Creates a context for the given company and user.
    #[must_use]
    pub const fn new(company_id: CompanyId, user_id: UserId) -> Self {
        Self {
            company_id,
            user_id,
        }
    }

    /// Creates a context for scheduled jobs that act without a human user.
    #[must_use]
    pub fn system(company_id: CompanyId) -> Self {
        Self {
            company_id,
            user_id: UserId::from_uuid(uuid::Uuid::nil()),
        }
    }
}
