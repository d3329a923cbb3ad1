// Record identifiers.
//
// The web frontend and the auth service both hand out cuid-style ids
// (lowercase, alphanumeric, leading `c`), so records created here follow
// the same shape.

use rand::distributions::Alphanumeric;
use rand::Rng;

const ID_BODY_LEN: usize = 24;

/// Generate a new 25 character record id.
pub fn new_id() -> String {
    let body: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(ID_BODY_LEN)
        .map(|b| (b as char).to_ascii_lowercase())
        .collect();
    format!("c{}", body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_shape() {
        let id = new_id();
        assert_eq!(id.len(), 25);
        assert!(id.starts_with('c'));
        assert!(id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_ids_are_unique() {
        let a = new_id();
        let b = new_id();
        assert_ne!(a, b);
    }
}
