pub mod resume;
pub mod session;
