use std::sync::Arc;

use fr_core::{AccessPolicy, FilterAggregator, Repositories};

/// State shared across all Actix-web workers.
pub struct AppState {
    pub repos: Repositories,
    pub aggregator: FilterAggregator,
    pub policy: Arc<dyn AccessPolicy>,
}

impl AppState {
    pub fn new(repos: Repositories, policy: Arc<dyn AccessPolicy>) -> Self {
        let aggregator = FilterAggregator::new(&repos, policy.clone());
        Self { repos, aggregator, policy }
    }
}
