//! Momentum Core - NBA query dispatch and scoring engine.
//!
//! This crate provides:
//! - Free-text command classification into a fixed set of intents
//! - Windowed statistics over game logs (hit-rate, volatility, trend delta)
//! - One scoring handler per intent, registered by intent
//! - The `MomentumAgent` facade streaming response chunks
//! - The stats data-source contract, an in-memory source and the live
//!   NBA stats API client with its circuit breaker

pub mod agent;
pub mod circuit_breaker;
pub mod classifier;
pub mod clients;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod models;
pub mod providers;
pub mod roster;
pub mod season;
pub mod teams;

pub use agent::{MomentumAgent, ResponseStream};
pub use classifier::{classify, Command, CommandArgs, Intent};
pub use config::AgentConfig;
pub use error::{HandlerResult, QueryError};
pub use models::{GameRecord, PropCandidate, ResponseChunk, StatCode};
pub use providers::{InMemoryStatsSource, StatsDataSource};
pub use season::{Clock, FixedClock, SystemClock};
