pub mod config;
pub mod errors;
pub mod model;

pub use config::LogGridConfig;
pub use errors::GridError;
pub use model::{
    InstrumentSpec, OrderIntent, ParseWarning, PendingPlacement, PriceLevel, Reconciliation,
    StrandedOrder, TickReport,
};
