use std::collections::HashSet;
use std::sync::{Arc, RwLock};

use crate::errors::{LoanError, Result};
use crate::types::PartyId;

/// answers whether a party may originate loans
pub trait AuthorizationAdapter: Send + Sync {
    fn is_authorized_originator(&self, identity: PartyId) -> bool;
}

/// admin-gated set of approved originators
///
/// cheap to clone; clones share the underlying set, so a handle given to
/// the engine stays in sync with the handle kept for administration
#[derive(Debug, Clone)]
pub struct OriginatorRegistry {
    admin: PartyId,
    originators: Arc<RwLock<HashSet<PartyId>>>,
}

impl OriginatorRegistry {
    /// create an empty registry controlled by the given administrator
    pub fn new(admin: PartyId) -> Self {
        Self {
            admin,
            originators: Arc::new(RwLock::new(HashSet::new())),
        }
    }

    /// administrator identity
    pub fn admin(&self) -> PartyId {
        self.admin
    }

    /// grant or revoke origination rights; administrator only
    pub fn set_authorized_originator(
        &self,
        caller: PartyId,
        identity: PartyId,
        allowed: bool,
    ) -> Result<()> {
        if caller != self.admin {
            return Err(LoanError::Unauthorized {
                party: caller,
                action: "manage originators".to_string(),
            });
        }

        let mut set = self
            .originators
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if allowed {
            set.insert(identity);
        } else {
            set.remove(&identity);
        }
        Ok(())
    }
}

impl AuthorizationAdapter for OriginatorRegistry {
    fn is_authorized_originator(&self, identity: PartyId) -> bool {
        self.originators
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&identity)
    }
}
