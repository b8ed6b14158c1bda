//! Core library for the estimating-tools command line application.
//!
//! Estimating exports pass through three stages, each reading the previous
//! stage's sheet from the same workbook: [`normalize`] pads ragged rows into
//! the nine-column "raw input" table, [`refine`] sums them per (Name, Units)
//! into "Refined values", and [`populate`] transfers those totals into the
//! label-addressed "Mechanical Breakdown" calculator. Workbook and CSV
//! adapters live under [`io`], the sheet representation in [`model`], and the
//! path-level entry points in [`pipeline`].

pub mod estimating;

pub use estimating::tools::{
    Result, ToolError, error, io, model, normalize, pipeline, populate, refine,
};
