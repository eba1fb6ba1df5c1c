//! Rule payload formats: the flat equality condition set and the structured
//! action descriptor. Both are persisted as JSON text on the rule record and
//! parsed here at dispatch time.

pub mod action;
pub mod condition;

pub use action::{ActionDescriptor, NotifyTarget};
pub use condition::conditions_match;
