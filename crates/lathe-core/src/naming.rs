//! Identifier conventions used when deriving generated member names.

/// Upper-cases the first character: `customerId` -> `CustomerId`.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `primaryOrder` -> `PRIMARY_ORDER`.
///
/// A separator is inserted before every upper-case character that is not the
/// first one, then everything is upper-cased.
pub fn screaming_snake(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if i > 0 && c.is_uppercase() {
            out.push('_');
        }
        out.extend(c.to_uppercase());
    }
    out
}

/// Accessor name for a property: `getter_name("customerId")` -> `getCustomerId`.
pub fn getter_name(property: &str) -> String {
    format!("get{}", capitalize(property))
}

pub fn setter_name(property: &str) -> String {
    format!("set{}", capitalize(property))
}
