//! Storage ports

mod repositories;

pub use repositories::{
    AggregateStore, EventLedger, LivestreamAggregateStore, LivestreamRepository, OwnershipResolver, RepoResult, UnitOfWork,
    UserRepository,
};
