pub mod comment;

pub use comment::*;
