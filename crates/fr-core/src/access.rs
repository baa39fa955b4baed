//! Read/write permission on filters.

use uuid::Uuid;

use crate::models::Filter;

/// Decides who may read or modify a filter.
///
/// `requester` is `None` for anonymous callers.
pub trait AccessPolicy: Send + Sync {
    fn can_view(&self, filter: &Filter, requester: Option<Uuid>) -> bool;
    fn can_modify(&self, filter: &Filter, requester: Option<Uuid>) -> bool;
}

/// Public filters are readable by anyone; everything else is owner-only.
#[derive(Debug, Clone, Copy, Default)]
pub struct OwnerPolicy;

impl AccessPolicy for OwnerPolicy {
    fn can_view(&self, filter: &Filter, requester: Option<Uuid>) -> bool {
        filter.is_public || requester == Some(filter.owner_id)
    }

    fn can_modify(&self, filter: &Filter, requester: Option<Uuid>) -> bool {
        requester == Some(filter.owner_id)
    }
}
