mod saved;
mod schema;
mod types;
mod users;

pub use schema::Database;
pub use types::{CredentialError, DatabaseError, SavedArticle, UserId, UserRecord};
