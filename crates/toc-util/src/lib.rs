use std::collections::BTreeSet;

// splits a name into its prefix and the number it ends with, if any
// "s100q200" -> ("s100q", Some(200)), "q" -> ("q", None)
pub fn split_trailing_number(name: &str) -> (&str, Option<u64>) {
    let digits = name
        .chars()
        .rev()
        .take_while(|c| c.is_ascii_digit())
        .count();

    if digits == 0 {
        return (name, None);
    }

    // digits are ascii, so counting chars == counting bytes here
    let (prefix, number) = name.split_at(name.len() - digits);
    match number.parse::<u64>() {
        Ok(value) => (prefix, Some(value)),
        // too many digits to fit, treat the whole thing as a plain name
        Err(_) => (name, None),
    }
}

// returns `base` if it is not taken, otherwise bumps the trailing number of `base`
// (or appends one) until the name is free
pub fn fresh_name(taken: &BTreeSet<String>, base: &str) -> String {
    if !taken.contains(base) {
        return base.to_string();
    }

    let (mut prefix, number) = split_trailing_number(base);
    let mut counter = number.unwrap_or(0);
    loop {
        counter = match counter.checked_add(1) {
            Some(next) => next,
            // out of numbers for this prefix, count on from the whole name instead
            None => {
                prefix = base;
                1
            }
        };
        let candidate = format!("{}{}", prefix, counter);
        if !taken.contains(&candidate) {
            return candidate;
        }
    }
}
