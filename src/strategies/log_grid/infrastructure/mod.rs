pub mod calculator;
pub mod emitter;
pub mod reconciler;

pub use calculator::{compute_levels, grid_ratio};
pub use emitter::OrderIntentEmitter;
pub use reconciler::reconcile;
