pub mod detect;
pub mod filters;
pub mod metrics;
pub mod preprocess;
pub mod signal;
pub mod windows;

pub use metrics::*;
pub use signal::*;
