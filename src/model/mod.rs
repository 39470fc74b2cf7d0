mod event;
mod league;
mod r#match;
mod raw;

pub use event::*;
pub use league::*;
pub use r#match::*;
pub use raw::*;
