//! Terminal presentation: every renderer returns the text to print.

pub mod dashboard;
pub mod list;
pub mod members;
pub mod setup;
pub mod subscription;
pub mod ui;
pub mod views;
