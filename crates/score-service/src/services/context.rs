//! Service context - dependency container for services
//!
//! Holds the store and the aggregation tuning shared by every service.

use std::sync::Arc;

use score_common::AggregationConfig;
use score_core::traits::{
    AggregateStore, EventLedger, LivestreamAggregateStore, LivestreamRepository, UserRepository,
};

use super::error::{ServiceError, ServiceResult};

/// Every port the services need, implemented by one store so that a single
/// transaction can span the ledger append and the score update
pub trait ScoreStore:
    UserRepository
    + LivestreamRepository
    + EventLedger
    + AggregateStore
    + LivestreamAggregateStore
    + 'static
{
}

impl<T> ScoreStore for T where
    T: UserRepository
        + LivestreamRepository
        + EventLedger
        + AggregateStore
        + LivestreamAggregateStore
        + 'static
{
}

/// Service context containing all dependencies
pub struct ServiceContext<S: ScoreStore> {
    store: Arc<S>,
    aggregation: AggregationConfig,
}

impl<S: ScoreStore> ServiceContext<S> {
    pub fn new(store: Arc<S>, aggregation: AggregationConfig) -> Self {
        Self { store, aggregation }
    }

    /// Get the backing store
    pub fn store(&self) -> &S {
        self.store.as_ref()
    }

    /// Shared handle to the backing store
    pub fn store_handle(&self) -> Arc<S> {
        Arc::clone(&self.store)
    }

    /// Retry and lock tuning for the aggregation engine
    pub fn aggregation(&self) -> &AggregationConfig {
        &self.aggregation
    }
}

impl<S: ScoreStore> Clone for ServiceContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            aggregation: self.aggregation.clone(),
        }
    }
}

impl<S: ScoreStore> std::fmt::Debug for ServiceContext<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceContext")
            .field("store", &std::any::type_name::<S>())
            .field("aggregation", &self.aggregation)
            .finish()
    }
}

/// Builder for creating ServiceContext with custom configuration
pub struct ServiceContextBuilder<S: ScoreStore> {
    store: Option<Arc<S>>,
    aggregation: AggregationConfig,
}

impl<S: ScoreStore> ServiceContextBuilder<S> {
    pub fn new() -> Self {
        Self {
            store: None,
            aggregation: AggregationConfig::default(),
        }
    }

    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn aggregation(mut self, aggregation: AggregationConfig) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Build the ServiceContext
    ///
    /// # Errors
    /// Returns `ServiceError::Validation` if the store is missing or the
    /// aggregation settings allow no attempt at all
    pub fn build(self) -> ServiceResult<ServiceContext<S>> {
        let store = self
            .store
            .ok_or_else(|| ServiceError::validation("store is required"))?;
        if self.aggregation.max_attempts == 0 {
            return Err(ServiceError::validation("max_attempts must be at least 1"));
        }
        Ok(ServiceContext::new(store, self.aggregation))
    }
}

impl<S: ScoreStore> Default for ServiceContextBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
