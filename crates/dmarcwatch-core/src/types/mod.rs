mod entry;
mod issue;
mod policy;
mod result;

pub use entry::*;
pub use issue::*;
pub use policy::*;
pub use result::*;
