//! Performance-management console service library crate.
//!
//! # Purpose
//! Exposes the console API surface, bearer-token verification, the goal,
//! feedback, and appraisal workflows, configuration, and storage for use by
//! the binary and tests.
//!
//! # Notes
//! Every permission decision is delegated to `perfdesk-authz`; this crate
//! decides only what to load and how to report a denial.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod observability;
pub mod store;
pub mod workflow;
