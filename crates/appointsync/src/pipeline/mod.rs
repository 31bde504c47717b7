//! Request pipeline stages.
//!
//! Each route is a tower service built from these stages, outermost first:
//! [`RecoverLayer`] turns handler errors into a 500 envelope, [`ValidationLayer`]
//! parses and validates the body, then the business handler runs.

mod event;
mod recover;
mod validate;

pub use event::{InboundEvent, RequestContext};
pub use recover::{Recover, RecoverLayer, UNEXPECTED_ERROR};
pub use validate::{Validate, Validated, ValidationLayer};
