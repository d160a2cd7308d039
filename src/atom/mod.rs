//! Box headers, the parsed box tree and the parser producing it.

mod header;
mod tree;
mod parser;

pub use header::{box_info, BoxInfo};
pub use tree::{Atom, BoxTree};
pub use parser::BoxParser;
