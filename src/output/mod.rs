mod response;
pub mod report;

pub use response::*;
