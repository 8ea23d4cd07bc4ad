pub mod json;
pub mod json_compact;
pub mod markdown;

pub use json::JsonFormatter;
pub use json_compact::JsonCompactFormatter;
pub use markdown::MarkdownFormatter;
