//! Experian Risk Assessment Library
//!
//! This library normalizes Experian credit-bureau reports ("Informe Delphi")
//! into flat risk records and derives the narrative shown to the user.
//!
//! # Modules
//!
//! - `cli`: Command-line interface of the `normalize_report` utility.
//! - `config`: Configuration management.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Risk record and assessment models.
//! - `narrative`: Reasons, context sentence and display formatting.
//! - `normalizer`: Report normalization logic.
//! - `profiles`: Loading of raw reports from disk.

pub mod cli;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod narrative;
pub mod normalizer;
pub mod profiles;
