//! Utility functions

/// Masks the local part of an email so it can be logged.
pub fn mask_email(email: &str) -> String {
    if let Some(at_pos) = email.find('@') {
        let (local, domain) = email.split_at(at_pos);
        let visible = match local.chars().count() {
            0 => 0,
            1 | 2 => 1,
            _ => 2,
        };
        let shown: String = local.chars().take(visible).collect();
        format!("{}***{}", shown, domain)
    } else {
        "***".to_string()
    }
}
