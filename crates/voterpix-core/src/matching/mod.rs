//! Image-to-identifier matching and output file naming.

mod namer;
mod registry;

pub use namer::{Assignment, PageNamer, Slot};
pub use registry::NameRegistry;
