use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::domain::{PostingId, UserId, UserIdentity};

/// Resolves acting users. Identities are owned by the external auth
/// service; this subsystem only reads them.
pub trait IdentityDirectory: Send + Sync {
    fn resolve(&self, id: &UserId) -> Option<UserIdentity>;
}

/// Resolves the recruiter owning a posting, the sole input to status
/// mutation authorization.
pub trait PostingDirectory: Send + Sync {
    fn owner_of(&self, posting: &PostingId) -> Option<UserId>;
}

/// Map-backed directory for local deployments and tests.
#[derive(Default, Clone)]
pub struct InMemoryDirectory {
    identities: Arc<Mutex<HashMap<UserId, UserIdentity>>>,
    owners: Arc<Mutex<HashMap<PostingId, UserId>>>,
}

impl InMemoryDirectory {
    pub fn register_identity(&self, identity: UserIdentity) {
        let mut guard = self.identities.lock().expect("directory mutex poisoned");
        guard.insert(identity.id.clone(), identity);
    }

    pub fn register_posting_owner(&self, posting: PostingId, owner: UserId) {
        let mut guard = self.owners.lock().expect("directory mutex poisoned");
        guard.insert(posting, owner);
    }
}

impl IdentityDirectory for InMemoryDirectory {
    fn resolve(&self, id: &UserId) -> Option<UserIdentity> {
        let guard = self.identities.lock().expect("directory mutex poisoned");
        guard.get(id).cloned()
    }
}

impl PostingDirectory for InMemoryDirectory {
    fn owner_of(&self, posting: &PostingId) -> Option<UserId> {
        let guard = self.owners.lock().expect("directory mutex poisoned");
        guard.get(posting).cloned()
    }
}
