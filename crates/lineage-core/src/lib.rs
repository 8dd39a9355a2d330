//! Core types and storage for a personal genealogy.
//!
//! Provides the family graph ([`lineage::Lineage`]) with its person arena and
//! relation rules, shortest-path search between relatives, JSON snapshots and
//! the session that tracks unsaved changes.

pub mod config;
pub mod error;
pub mod lineage;
pub mod paths;
pub mod person;
pub mod schema;
pub mod session;
pub mod storage;
