//! Data layer: discovery, loading, filtering and aggregation.
//!
//! Architecture:
//! ```text
//!  data/ directory
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  locate   │  NFC-normalized fragment match → file path
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  per-site CSVs / workbook sheets → merged Table
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  site selection → order-preserving row subset
//!   └──────────┘
//!        │
//!        ▼
//!   ┌───────────┐
//!   │ aggregate  │  per-site means, best site, box stats, correlation
//!   └───────────┘
//! ```

pub mod aggregate;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod filter;
pub mod loader;
pub mod locate;
pub mod model;
pub mod normalize;
