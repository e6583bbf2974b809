pub mod reader;
pub mod writer;

pub use reader::*;
pub use writer::*;
