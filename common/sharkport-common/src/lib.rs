pub mod frontend;
pub mod timeutils;
