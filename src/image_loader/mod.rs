pub mod header;
pub mod loader;
pub mod writer;

pub use header::*;
pub use loader::*;
pub use writer::*;
