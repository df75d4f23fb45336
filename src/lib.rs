//! marketscout - marketplace product discovery, extraction and price tracking.
//!
//! Renders product pages from Korean and global marketplaces in paced,
//! isolated browser sessions, extracts normalized product records, and keeps
//! a small JSON store of tracked listings, daily price history and
//! per-keyword price insights.

pub mod browser;
pub mod cli;
pub mod config;
pub mod discovery;
pub mod extract;
pub mod models;
pub mod pacing;
pub mod repository;
pub mod services;
pub mod work_queue;
