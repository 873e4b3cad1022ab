//! # Relative Rotation Analytics
//!
//! This crate is the pure core of the rotation-graph pipeline: it aligns
//! multi-symbol daily histories, derives the normalized RS-Ratio and
//! RS-Momentum oscillators against a benchmark, and packages them into an
//! immutable, queryable result.
//!
//! ## Architectural Principles
//!
//! - **Pure logic:** no I/O, no clocks, no hidden state. Every function is
//!   deterministic over its inputs, so a result can be recomputed or memoized
//!   by request equality.
//! - **No fake neutrals:** warm-up rows are excluded from the output tables,
//!   never zero-filled; a gap is either excluded or reported.
//!
//! ## Public API
//!
//! - `align_study` / `AlignedStudy`: the common-date-index join.
//! - `apply_volatility`: the realized-volatility study transform.
//! - `compute_tables` / `RsTables`: the relative-strength engine.
//! - `build_tail` / `TailPoint`: rotation-trail resampling.
//! - `RrgResult` / `ChartSpec`: the read-only snapshot handed to callers.

// Declare the modules that constitute this crate.
pub mod align;
pub mod engine;
pub mod error;
pub mod result;
pub mod series;
pub mod tail;
pub mod volatility;

// Re-export the key components to create a clean, public-facing API.
pub use align::{align_study, AlignedStudy};
pub use engine::{compute_tables, RsTables};
pub use error::AnalyticsError;
pub use result::{ChartSeries, ChartSpec, DroppedSymbol, Quadrant, RrgResult, NEUTRAL};
pub use series::{IndicatorTable, StudySeries};
pub use tail::{build_tail, build_tails, TailPoint};
pub use volatility::{apply_volatility, realized_volatility};
