pub mod book;
pub mod serve;
