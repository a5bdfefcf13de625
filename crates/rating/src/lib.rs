#![deny(
    missing_docs,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    // This is turned off because of the rating values in the structs
    clippy::module_name_repetitions,
    // "RatingModel" shows up as a false positive otherwise
    clippy::doc_markdown,
)]
#![doc = include_str!("../README.md")]

pub mod glicko;
pub mod model;

pub use glicko::{GlickoConfig, GlickoRating};
pub use model::RatingModel;
