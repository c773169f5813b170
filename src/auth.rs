//! Auth-domain identifiers, scope sets, and credential models.

pub mod id;
pub mod scope;
pub mod token;

pub use id::*;
pub use scope::*;
pub use token::{credential::*, secret::*, user::*};
