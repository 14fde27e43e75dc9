//! # System Module
//!
//! Stage control and structural metrics.
//!
//! - `stage`: the stage cursor, its transition table and trace
//! - `topology`: density, degree, clustering and component metrics

mod stage;
mod topology;

pub use stage::*;
pub use topology::*;
