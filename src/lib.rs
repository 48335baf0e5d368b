//! Commodity Dash - percentage-change dashboard for monthly commodity prices.
//!
//! Loads a wide monthly price sheet, derives month-over-month percentage
//! changes and shows them as scatter and violin charts at monthly,
//! quarterly or yearly resolution.

pub mod charts;
pub mod config;
pub mod data;
pub mod gui;
pub mod logging;
pub mod stats;
