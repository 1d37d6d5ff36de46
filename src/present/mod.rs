//! Presenter: chart specifications and display strings built from summary tables.

pub mod chart;
pub mod format;
