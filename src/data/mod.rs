//! Static lookup data loaded once at startup
//!
//! - `class_index`: classifier output index <-> food label
//! - `nutrition`: per-100g nutrition facts keyed by normalized label

pub mod class_index;
pub mod nutrition;

pub use class_index::ClassIndex;
pub use nutrition::{normalize_label, NutritionRecord, NutritionTable, NutritionValue};

/// Turn a raw label into its display form.
///
/// Underscores become spaces and each word is title-cased: a letter is
/// upper-cased when it follows a non-letter and lower-cased otherwise.
pub fn display_name(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_is_letter = false;

    for c in label.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("grilled_chicken"), "Grilled Chicken");
        assert_eq!(display_name("pizza"), "Pizza");
        assert_eq!(display_name("BBQ_ribs"), "Bbq Ribs");
        assert_eq!(display_name("mac_and_cheese"), "Mac And Cheese");
    }

    #[test]
    fn test_display_name_non_letters() {
        assert_eq!(display_name("pad_thai_2"), "Pad Thai 2");
        assert_eq!(display_name("chef's_salad"), "Chef'S Salad");
        assert_eq!(display_name(""), "");
    }
}
