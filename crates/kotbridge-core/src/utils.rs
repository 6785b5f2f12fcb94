//! Helpers shared by frontends.

pub mod names;

#[doc(inline)]
pub use names::{last_segment, qualify};
