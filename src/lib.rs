//! git-revlens: line-level revision history for a git work tree.
//!
//! The core answers two questions: which commit last changed a given line,
//! and what a file looked like before that. `git` wraps libgit2 behind the
//! async `GitDataSource` seam, `commands` turn editor context into
//! comparisons, and `explorer` exposes branch history as a lazy tree. The
//! `routes` module serves all of it over HTTP.

pub mod commands;
pub mod config;
pub mod error;
pub mod explorer;
pub mod git;
pub mod models;
pub mod routes;
