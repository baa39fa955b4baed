//! # Filter Aggregator
//!
//! Turns a saved filter into the list of freets it selects.
//!
//! Criteria are OR-combined within and across the author, tag and intent
//! slots: the result is the union of every lookup, newest first. An empty
//! slot contributes nothing, so a filter with no criteria selects nothing.

use std::collections::BTreeSet;
use std::sync::Arc;

use log::{debug, warn};
use uuid::Uuid;

use crate::access::AccessPolicy;
use crate::error::{AppError, Result};
use crate::lookup::RelationLookups;
use crate::models::Freet;
use crate::traits::{FilterRepo, FreetRepo, Repositories};

#[derive(Clone)]
pub struct FilterAggregator {
    filters: Arc<dyn FilterRepo>,
    freets: Arc<dyn FreetRepo>,
    lookups: RelationLookups,
    policy: Arc<dyn AccessPolicy>,
}

impl FilterAggregator {
    pub fn new(repos: &Repositories, policy: Arc<dyn AccessPolicy>) -> Self {
        Self {
            filters: repos.filters.clone(),
            freets: repos.freets.clone(),
            lookups: RelationLookups::new(
                repos.freets.clone(),
                repos.tags.clone(),
                repos.intents.clone(),
            ),
            policy,
        }
    }

    /// Resolves and authorizes the filter, then aggregates.
    ///
    /// `NotFound` and `Forbidden` are decided before any lookup runs. Lookup
    /// phases run in order and the first failure aborts the whole call.
    pub async fn apply_filter(&self, filter_id: Uuid, requester: Option<Uuid>) -> Result<Vec<Freet>> {
        let filter = self
            .filters
            .get(filter_id)
            .await?
            .ok_or_else(|| AppError::not_found("Filter", filter_id))?;

        if !self.policy.can_view(&filter, requester) {
            warn!("filter {filter_id} is private, rejecting requester {requester:?}");
            return Err(AppError::Forbidden(
                "Cannot read other users' filters.".to_string(),
            ));
        }

        let criteria = &filter.criteria;
        let mut matched = BTreeSet::new();

        for author in &criteria.authors {
            matched.extend(self.lookups.by_author(*author).await?);
        }
        debug!("filter {filter_id}: {} freets after author phase", matched.len());

        for label in &criteria.tags {
            matched.extend(self.lookups.by_tag(label).await?);
        }
        debug!("filter {filter_id}: {} freets after tag phase", matched.len());

        for kind in &criteria.intents {
            matched.extend(self.lookups.by_intent(*kind).await?);
        }
        debug!("filter {filter_id}: {} freets after intent phase", matched.len());

        if matched.is_empty() {
            return Ok(Vec::new());
        }

        let mut freets = self
            .freets
            .fetch_by_ids(&matched)
            .await
            .map_err(AppError::lookup)?;
        newest_first(&mut freets);
        Ok(freets)
    }
}

/// Creation time descending; id descending breaks ties.
pub fn newest_first(freets: &mut [Freet]) {
    freets.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| b.id.cmp(&a.id)));
}
