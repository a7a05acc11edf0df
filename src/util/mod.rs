//! Utility functions for common operations.
//!
//! - **URL validation**: the news API base URL must be HTTPS (loopback excepted)
//! - **Text processing**: control-character stripping and width-aware truncation
//!   for printing remote text in the terminal

mod text;
mod url_validator;

pub use text::{display_width, single_line, strip_control_chars};
pub use url_validator::{validate_base_url, UrlValidationError};
