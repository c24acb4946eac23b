pub mod generated;
pub mod markup;
pub mod parse;
pub mod text;

pub use generated::{ContentField, GeneratedContent};
pub use parse::parse_response;
