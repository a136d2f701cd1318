//! Display names for the categorical vocabularies

/// Merchant categories of the historical dataset, in encoder order
pub const MERCHANT_CATEGORIES: [&str; 14] = [
    "entertainment",
    "food_dining",
    "gas_transport",
    "grocery_net",
    "grocery_pos",
    "health_fitness",
    "home",
    "kids_pets",
    "misc_net",
    "misc_pos",
    "personal_care",
    "shopping_net",
    "shopping_pos",
    "travel",
];

/// US postal codes with state names, sorted by code
pub const US_STATES: [(&str, &str); 50] = [
    ("AK", "Alaska"),
    ("AL", "Alabama"),
    ("AR", "Arkansas"),
    ("AZ", "Arizona"),
    ("CA", "California"),
    ("CO", "Colorado"),
    ("CT", "Connecticut"),
    ("DE", "Delaware"),
    ("FL", "Florida"),
    ("GA", "Georgia"),
    ("HI", "Hawaii"),
    ("IA", "Iowa"),
    ("ID", "Idaho"),
    ("IL", "Illinois"),
    ("IN", "Indiana"),
    ("KS", "Kansas"),
    ("KY", "Kentucky"),
    ("LA", "Louisiana"),
    ("MA", "Massachusetts"),
    ("MD", "Maryland"),
    ("ME", "Maine"),
    ("MI", "Michigan"),
    ("MN", "Minnesota"),
    ("MO", "Missouri"),
    ("MS", "Mississippi"),
    ("MT", "Montana"),
    ("NC", "North Carolina"),
    ("ND", "North Dakota"),
    ("NE", "Nebraska"),
    ("NH", "New Hampshire"),
    ("NJ", "New Jersey"),
    ("NM", "New Mexico"),
    ("NV", "Nevada"),
    ("NY", "New York"),
    ("OH", "Ohio"),
    ("OK", "Oklahoma"),
    ("OR", "Oregon"),
    ("PA", "Pennsylvania"),
    ("RI", "Rhode Island"),
    ("SC", "South Carolina"),
    ("SD", "South Dakota"),
    ("TN", "Tennessee"),
    ("TX", "Texas"),
    ("UT", "Utah"),
    ("VA", "Virginia"),
    ("VT", "Vermont"),
    ("WA", "Washington"),
    ("WI", "Wisconsin"),
    ("WV", "West Virginia"),
    ("WY", "Wyoming"),
];

/// `grocery_pos` -> `Grocery Pos`
pub fn format_category(category: &str) -> String {
    category
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn state_name(code: &str) -> Option<&'static str> {
    US_STATES
        .binary_search_by(|(c, _)| (*c).cmp(code))
        .ok()
        .map(|i| US_STATES[i].1)
}

/// `CA` -> `CA - California`; unknown codes pass through unchanged
pub fn format_state(code: &str) -> String {
    match state_name(code) {
        Some(name) => format!("{} - {}", code, name),
        None => code.to_string(),
    }
}

pub fn format_gender(gender: &str) -> &str {
    match gender {
        "M" => "Male",
        "F" => "Female",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_category() {
        assert_eq!(format_category("grocery_pos"), "Grocery Pos");
        assert_eq!(format_category("home"), "Home");
        assert_eq!(format_category("misc_NET"), "Misc Net");
    }

    #[test]
    fn test_state_table_sorted_for_lookup() {
        assert!(US_STATES.windows(2).all(|w| w[0].0 < w[1].0));
        assert_eq!(state_name("CA"), Some("California"));
        assert_eq!(state_name("WY"), Some("Wyoming"));
        assert_eq!(state_name("DC"), None);
    }

    #[test]
    fn test_format_state() {
        assert_eq!(format_state("NY"), "NY - New York");
        assert_eq!(format_state("ZZ"), "ZZ");
    }
}
