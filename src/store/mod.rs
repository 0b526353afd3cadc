//! Repository functions per entity.
//!
//! Every function takes any [`sea_orm::ConnectionTrait`], so callers decide
//! whether it runs on the pool, inside a transaction, or inside a savepoint.

pub mod accounts;
pub mod authors;
pub mod films;
pub mod ratings;
pub mod spectators;
pub mod tokens;
