//! Text normalization for request matching.
//!
//! Keywords and date phrases match as substrings of the case-folded
//! request. Nothing else is rewritten, so spacing and spelling are
//! significant.

/// Case-fold a request for keyword and phrase matching
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
}
