// Copyright 2026 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! This crate contains the integration test suite for `atlas_text`.
//!
//! - The `util` module contains the fixtures shared by different test modules: a
//!   proportional test font, a submitter that records draw calls and a `TestEnv` tying
//!   them to a renderer and a CPU texture backend.
//! - We do not use the default Rust test harness, but instead use this `mod.rs` file as the
//!   entry point to run all other tests. This makes it easier to share the fixtures.
//! - If you want to add new tests, put them into the module of their "topic" (atlas,
//!   batching, fills, lifecycle), or create a new one in case it doesn't exist yet.
//! - For test naming, put the "topic" of the test at the start of the name instead of
//!   the end. For example, `atlas_sparse_commits_touched_tiles` is better than
//!   `sparse_commits_touched_tiles_in_atlas`.

#![allow(missing_docs, reason = "we don't need docs for testing")]
#![allow(clippy::cast_possible_truncation, reason = "not critical for testing")]

mod fills;
#[macro_use]
mod util;
