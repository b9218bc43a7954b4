//! # score-service
//!
//! Application layer: the aggregation engine that keeps score rows in step
//! with the event ledger, user and livestream registration, and the score
//! read path. Services are generic over a store implementing every port.

pub mod dto;
pub mod services;

pub use services::{
    AggregationEngine, LivestreamService, ScoreReader, ScoreStore, ServiceContext,
    ServiceContextBuilder, ServiceError, ServiceResult, UserService,
};
