pub mod account;
pub mod external_identity;
pub mod todo;

pub use account::{Account, UserResponse, ROLE_ADMIN, ROLE_USER};
pub use external_identity::{ExternalIdentity, Provider};
pub use todo::{Todo, TodoInput};
