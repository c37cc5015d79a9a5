pub mod records;
pub mod responses;

pub use records::*;
pub use responses::*;
