//! Core of the CRACK PROTOCOL backend.
//!
//! `game` holds the pure progress heuristics (keyword scoring, hint cadence,
//! solution detection, progress aggregation). `guard` wraps the external
//! chat-completions call with leak detection, language policy and a
//! deterministic fallback. `models` and `error` are the wire types shared by
//! the API service and the terminal client.

pub mod error;
pub mod game;
pub mod guard;
pub mod models;
