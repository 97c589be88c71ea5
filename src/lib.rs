//! Browser front-end for the Aleo ZK prediction market.
//!
//! The core (session, submission, notices, indexer) is plain Rust and is
//! tested natively; `app` and `picker` are the Dioxus components on top.

#![allow(non_snake_case)]

pub mod app;
pub mod config;
pub mod indexer;
pub mod notice;
pub mod picker;
pub mod transition;
pub mod wallet;
