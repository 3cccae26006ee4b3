use uuid::Uuid;

/// Generate a lowercase id: the entity prefix followed by 20 hex chars of a v4 UUID.
pub fn generate_unique_id(prefix: &str) -> String {
    let hex = Uuid::new_v4().to_string().replace('-', "");
    format!("{}{}", prefix, &hex[..20])
}

/// Caller supplied ids are accepted as-is apart from case.
pub fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_carry_prefix_and_are_lowercase() {
        let a = generate_unique_id("dept");
        let b = generate_unique_id("dept");
        assert!(a.starts_with("dept"));
        assert_eq!(a.len(), 24);
        assert_eq!(a, a.to_lowercase());
        assert_ne!(a, b);
    }

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize_id(" DEPT-Sales "), "dept-sales");
    }
}
