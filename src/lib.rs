//! Core library for the table-fusion command line application.
//!
//! The library merges spreadsheet exports whose header rows sit at different
//! offsets and whose column sets only partially overlap. Header detection lives
//! in [`detect`], column unification in [`unify`], spreadsheet adapters under
//! [`io`], and the end-to-end orchestration in [`pipeline`].

pub mod config;
pub mod detect;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod summary;
pub mod unify;

pub use error::{FusionError, Result};
