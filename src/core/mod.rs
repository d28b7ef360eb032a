/// Core functionality modules
///
/// The homework records, the notes attached to them, and the sample data
/// used to bootstrap a fresh database.

pub mod post;
pub mod seed;
pub mod user;

pub use post::Post;
pub use seed::{init_users, SeedReport};
pub use user::{User, UserUpdate};
