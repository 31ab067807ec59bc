pub mod account;
pub mod quote;
