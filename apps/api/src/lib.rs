//! Turfhub API Library
//!
//! This library provides the core functionality for the Turfhub API:
//! team management, the art gallery, tournament check-in and bracket
//! presentation, and site navigation.

pub mod api;
pub mod auth;
pub mod config;
pub mod domain;
pub mod infrastructure;
