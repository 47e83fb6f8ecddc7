use uuid::Uuid;

use crate::auth::token::Identity;
use crate::error::AppError;

/// A resource that belongs to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

/// Ownership-based access control, applied by every handler that touches an owned resource.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy {
    /// When set, a foreign resource is reported as missing instead of forbidden.
    pub mask_foreign: bool,
}

impl AccessPolicy {
    pub fn new(mask_foreign: bool) -> Self {
        Self { mask_foreign }
    }

    pub fn can_access<R: Owned + ?Sized>(&self, identity: &Identity, resource: &R) -> bool {
        resource.owner_id() == identity.user_id
    }

    /// Resolves a freshly loaded resource into an allowed one.
    ///
    /// Existence is checked before ownership: `None` is `NotFound`; a resource owned by
    /// someone else is `Forbidden` (or `NotFound` under masking).
    pub fn authorize<R: Owned>(
        &self,
        identity: &Identity,
        resource: Option<R>,
        what: &str,
    ) -> Result<R, AppError> {
        let resource = resource.ok_or_else(|| AppError::NotFound(format!("{} not found", what)))?;

        if self.can_access(identity, &resource) {
            return Ok(resource);
        }

        log::warn!(
            "user {} denied access to {} owned by {}",
            identity.user_id,
            what.to_lowercase(),
            resource.owner_id()
        );
        if self.mask_foreign {
            Err(AppError::NotFound(format!("{} not found", what)))
        } else {
            Err(AppError::Forbidden(format!("You do not own this {}", what.to_lowercase())))
        }
    }
}
