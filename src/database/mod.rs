pub mod imports;
pub mod manager;
pub mod models;
pub mod products;
pub mod users;

pub use manager::{DatabaseError, DatabaseManager};
pub use models::{ImportLog, Product, User};

/// Identifier format gate for `:id` path segments and bulk id sets: 36
/// characters drawn from `[0-9a-fA-F-]`. Malformed ids are rejected before
/// any store lookup. A string that passes this gate but is not a parseable
/// UUID cannot exist in the store and falls through to "not found".
pub fn is_candidate_id(id: &str) -> bool {
    id.len() == 36 && id.chars().all(|c| c.is_ascii_hexdigit() || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_uuid_shaped_ids() {
        assert!(is_candidate_id("123e4567-e89b-12d3-a456-426614174000"));
        assert!(is_candidate_id("ABCDEF00-e89b-12d3-a456-426614174000"));
        // Charset-valid but not a parseable UUID still passes the gate
        assert!(is_candidate_id("------------------------------------"));
    }

    #[test]
    fn rejects_wrong_length_or_charset() {
        assert!(!is_candidate_id(""));
        assert!(!is_candidate_id("123"));
        assert!(!is_candidate_id("123e4567-e89b-12d3-a456-42661417400")); // 35
        assert!(!is_candidate_id("123e4567-e89b-12d3-a456-4266141740000")); // 37
        assert!(!is_candidate_id("123e4567-e89b-12d3-a456-42661417400g"));
        assert!(!is_candidate_id("'; DROP TABLE products; -- padding--"));
    }
}
