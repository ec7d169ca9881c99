pub mod body_parser;
pub mod body_serializer;

pub use body_parser::{classify_line, parse_segments, tilde_labels};
pub use body_serializer::{serialize_segments, trim_segment};
