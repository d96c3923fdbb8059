//! Request and Response models for the secret service API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{DistributionQuery, GenerateRequest, HistoryQuery};
pub use responses::{
    CacheStatsResponse, ClearResponse, DeleteResponse, DistributionResponse, ErrorResponse,
    GenerateResponse, HealthResponse, HistoryResponse, Pagination, PerformanceResponse,
    StatsResponse,
};
