pub mod author;
pub mod canonical;
pub mod category;
pub mod identifiers;
pub mod publication;
pub mod record;
pub mod source;
pub mod venue;

pub use author::*;
pub use canonical::*;
pub use category::*;
pub use identifiers::*;
pub use publication::*;
pub use record::*;
pub use source::*;
pub use venue::*;
