pub mod filename;
pub mod text;

pub use filename::sanitize_header_filename;
pub use text::{fold_accents, to_printable_ascii};
