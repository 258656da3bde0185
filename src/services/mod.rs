//! Service layer.
//!
//! Read-only reports and resource queries that sit beside the dispatcher.

pub mod resources;
pub mod status;

pub use resources::{CandleQuery, CANDLES_URI_PREFIX, CANDLE_RESOURCE_LIMIT, WALLETS_URI};
pub use status::{ConfigReport, ConnectionReport, ServiceCheck, StatusReport};
