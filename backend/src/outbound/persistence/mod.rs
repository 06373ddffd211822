//! PostgreSQL persistence adapters using Diesel.
//!
//! Each repository implements one driven port from `domain::ports` and only
//! translates between Diesel rows and domain types. Row structs (`models`)
//! and table definitions (`schema`) stay private to this module.
//!
//! ```ignore
//! use ideahub::outbound::persistence::{DbPool, DieselIdeaRepository, PoolConfig};
//!
//! run_migrations(url).await?;
//! let pool = DbPool::new(PoolConfig::new(url)).await?;
//! let ideas = DieselIdeaRepository::new(pool.clone());
//! ```

mod diesel_analytics_repository;
mod diesel_basic_error_mapping;
mod diesel_group_repository;
mod diesel_idea_repository;
mod diesel_membership_repository;
mod diesel_project_repository;
mod diesel_refresh_token_repository;
mod diesel_user_repository;
mod diesel_vote_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_analytics_repository::DieselAnalyticsRepository;
pub use diesel_group_repository::DieselGroupRepository;
pub use diesel_idea_repository::DieselIdeaRepository;
pub use diesel_membership_repository::DieselMembershipRepository;
pub use diesel_project_repository::DieselProjectRepository;
pub use diesel_refresh_token_repository::DieselRefreshTokenRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use diesel_vote_repository::DieselVoteRepository;
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
