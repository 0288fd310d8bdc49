//! Resume revision: the revamp endpoint and the conversational session that
//! drives it one instruction at a time.

pub mod handlers;
pub mod session;
