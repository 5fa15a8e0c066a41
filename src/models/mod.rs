pub mod alert;
pub mod source;

pub use alert::*;
pub use source::*;
