pub mod replay;
pub mod tools;
