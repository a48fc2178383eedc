pub mod calc;
pub mod chat;
