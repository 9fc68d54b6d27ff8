//! User-facing notification text.

pub const MISSING_CREDENTIALS: &str = "Please enter username and password!";
pub const SIGNED_IN: &str = "Signed in successfully!";
pub const SIGNED_UP: &str = "Signup successful!";
pub const SIGNED_OUT: &str = "Signed out.";
pub const SIGN_IN_REQUIRED: &str = "You must sign in to save books!";
pub const ALREADY_IN_LIBRARY: &str = "Book already in library!";
pub const SESSION_EXPIRED: &str = "Session expired. Please login again.";
pub const NO_BOOKS_FOUND: &str = "No books found.";
pub const SEARCH_FAILED: &str = "Failed to fetch books.";

pub fn added_to_library(title: &str) -> String {
    format!("{title} added to library!")
}

pub fn removed_from_library(title: &str) -> String {
    format!("{title} removed from library!")
}
