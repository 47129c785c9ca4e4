//! Ovenbird server library.
//!
//! This crate provides the backend functionality as a library, allowing it
//! to be tested and reused (the integration-tests crate drives the services
//! directly against a live database).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
