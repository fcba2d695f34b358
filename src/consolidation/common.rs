//! Small string helpers shared by the form builder and the input applier.

/// Title-case a string: a letter is upper-cased when it does not follow another
/// letter, lower-cased otherwise ("job_title" style keys should be split first).
pub fn title_case(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    let mut previous_is_letter = false;

    for ch in value.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }

    result
}

/// Turn a snake_case key into a human label ("tax_id" -> "Tax Id").
pub fn humanize_key(key: &str) -> String {
    title_case(&key.replace('_', " "))
}

/// Normalize a raw placeholder name before matching it against synonyms.
pub fn normalize_name(raw_name: &str) -> String {
    raw_name.to_lowercase()
}
