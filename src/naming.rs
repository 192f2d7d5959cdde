//! Registration name derivation
//!
//! A class identifier is turned into a registration name by inserting a
//! hyphen wherever an ASCII uppercase letter directly follows an ASCII
//! lowercase letter or digit, then lowercasing everything. Runs of
//! uppercase letters are kept together, so `XUIButton` becomes `xuibutton`
//! and is rejected for lacking a hyphen.
//!
//! | identifier     | derived         |
//! |----------------|-----------------|
//! | `XuiButton`    | `xui-button`    |
//! | `MyHTMLWidget` | `my-htmlwidget` |
//! | `Widget2Panel` | `widget2-panel` |
//! | `Button`       | `button`        |

use crate::error::NamingError;

/// Separator every registration name must contain
pub const SEPARATOR: char = '-';

/// Derive a registration name from a class identifier
pub fn derive_tag_name(ident: &str) -> String {
    let mut name = String::with_capacity(ident.len() + 4);
    let mut prev: Option<char> = None;
    for c in ident.chars() {
        if let Some(p) = prev {
            if (p.is_ascii_lowercase() || p.is_ascii_digit()) && c.is_ascii_uppercase() {
                name.push(SEPARATOR);
            }
        }
        name.push(c.to_ascii_lowercase());
        prev = Some(c);
    }
    name
}

/// Derive a registration name and check it contains a hyphen
pub fn tag_name(class_ident: &str) -> Result<String, NamingError> {
    let derived = derive_tag_name(class_ident);
    if !derived.contains(SEPARATOR) {
        return Err(NamingError::DerivedNameLacksDash {
            class: class_ident.to_string(),
            derived,
        });
    }
    Ok(derived)
}

/// Check an author-supplied registration name
pub fn validate_explicit_name(name: &str) -> Result<(), NamingError> {
    if !name.contains(SEPARATOR) {
        return Err(NamingError::ExplicitNameLacksDash {
            name: name.to_string(),
        });
    }
    Ok(())
}
