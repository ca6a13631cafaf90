//! Terminal rendering of the dashboard.
//!
//! ```text
//!   Dataset ──► FilteredView ──► Aggregates
//!                                   │
//!                                   ▼
//!                    panels (sections) ──► table (arrow pretty print)
//! ```
pub mod panels;
pub mod table;
