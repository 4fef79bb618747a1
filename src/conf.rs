//! Settings, startup wiring, template search path and translation.

pub use formbind_conf::*;
