//! Form views, the form engine seam, wizards and upload storage.

pub use formbind_forms::*;
