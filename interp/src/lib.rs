#![deny(clippy::dbg_macro)]
//! Content stream interpreter of PDF pages, patterns, forms and glyph
//! procedures, painting to an abstract `Device`.
pub mod device;
pub mod error;
pub mod graphics;
pub mod gstate;
pub mod interpreter;
pub mod lexer;
pub mod material;
pub mod object;
pub mod ocg;
mod operator;
pub mod option;
pub mod outline;
pub mod page;
pub mod resources;
pub mod text;

#[cfg(test)]
mod test_utils;

pub use device::Device;
pub use error::{InterpretError, InterpretResult};
pub use interpreter::Interpreter;
pub use option::{InterpretOption, InterpretOptionBuilder, Usage};
pub use page::{run_content, run_glyph, run_page, run_page_with_usage, Annotation, Page};
