// jsonscrub/src/lib.rs
//! # jsonscrub CLI Application
//!
//! Terminal front end for `jsonscrub-core`: loads documents from disk,
//! runs them through a batch, prints per-document status and diffs, and
//! exports the documents that changed.

pub mod cli;
pub mod commands;
pub mod logger;
pub mod ui;
