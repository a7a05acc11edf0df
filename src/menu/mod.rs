//! Interactive menus.
//!
//! - `console` - styled output, prompts and numbered menus
//! - `services` - the capabilities a session needs (accounts, saved
//!   articles, news search) and their implementations
//! - `selection` - parsing of list positions and source choices
//! - `session` - the menu flow itself

mod console;
mod selection;
mod services;
mod session;

pub use console::{Console, MenuError, INVALID};
pub use services::{Accounts, NewsSearch, SavedArticles};
pub use session::Session;
