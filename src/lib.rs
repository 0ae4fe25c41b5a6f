// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! CodeVault - Code Submission Service
//!
//! This crate provides an HTTP API for user accounts and their uploaded
//! code submissions. Authentication is session-less: login issues a
//! signed bearer token carrying a role snapshot, and every guarded
//! request re-confirms that snapshot against the stored account before
//! any handler runs.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Password hashing, token issue/verify, request guard
//! - `query` - Pagination and field-projection normalization
//! - `storage` - File-backed document and upload storage

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod query;
pub mod state;
pub mod storage;
