//! Regex patterns for social-post content checks.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Hashtag: '#' followed by one or more word characters
    pub static ref HASHTAG: Regex = Regex::new(r"#\w+").unwrap();

    // Mention: '@' followed by one or more word characters
    pub static ref MENTION: Regex = Regex::new(r"@\w+").unwrap();

    // HTTP or HTTPS URL prefix
    pub static ref LINK: Regex = Regex::new(r"https?://").unwrap();
}
