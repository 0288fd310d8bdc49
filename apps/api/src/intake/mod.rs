//! Document intake: upload validation, text extraction, structuring.

pub mod extract;
pub mod handlers;
