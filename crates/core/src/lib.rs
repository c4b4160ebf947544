//! Bloomway Core - Shared domain types and catalog logic.
//!
//! This crate provides the types and pure transformations used across all
//! Bloomway components:
//! - `storefront` - Server-rendered flower shop in front of the REST API
//! - `cli` - Operator tools that talk to the same REST API
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Everything here is a function of its inputs, which keeps the
//! catalog rules testable in isolation.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, roles and statuses
//! - [`models`] - Records exchanged with the REST API
//! - [`catalog`] - Product filtering/sorting and the category tree
//! - [`cart`] - Session cart and favorites totals
//! - [`access`] - Role gating for protected pages
//! - [`i18n`] - Language selection and UI labels

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod cart;
pub mod catalog;
pub mod i18n;
pub mod models;
pub mod types;

pub use types::*;
