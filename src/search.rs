use crate::contact::Contact;

/// Normalize a string for name matching.
pub fn normalize(s: &str) -> String {
    s.to_lowercase()
}

/// Case-insensitive substring match on a contact name.
/// A missing or empty name never matches, not even the empty query.
pub fn name_matches(name: Option<&str>, normalized_query: &str) -> bool {
    match name {
        Some(name) if !name.is_empty() => normalize(name).contains(normalized_query),
        _ => false,
    }
}

/// Contacts whose name contains `query`, in their original order.
pub fn filter_by_name(contacts: &[Contact], query: &str) -> Vec<Contact> {
    let needle = normalize(query);
    contacts
        .iter()
        .filter(|contact| name_matches(contact.name.as_deref(), &needle))
        .cloned()
        .collect()
}
