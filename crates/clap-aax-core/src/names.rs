//! Short-name generation
//!
//! AAX control surfaces ask for names of a given maximum length (often 4, 6
//! or 8 characters). Plugin and parameter names are expanded once into a list
//! of variants ordered from longest to shortest, and a fitting variant is
//! picked per request.

/// Produce progressively shorter variants of `input`.
///
/// Order: original, spaces removed, first three characters per word, first
/// and last character per word, initials. When the initials are still longer
/// than two characters, the first two characters of the first word are
/// appended. Lengths never increase along the list.
pub fn short_names(input: &str) -> Vec<String> {
    let words: Vec<&str> = input.split_whitespace().collect();

    let mut variants = Vec::with_capacity(6);
    variants.push(input.to_string());
    variants.push(input.chars().filter(|c| !c.is_whitespace()).collect());
    variants.push(words.iter().flat_map(|w| w.chars().take(3)).collect());
    variants.push(
        words
            .iter()
            .flat_map(|w| {
                let mut chars = w.chars();
                let first = chars.next();
                let last = chars.next_back();
                first.into_iter().chain(last)
            })
            .collect(),
    );
    variants.push(words.iter().filter_map(|w| w.chars().next()).collect());

    let initials_len = variants.last().map_or(0, |s: &String| s.chars().count());
    if initials_len > 2 {
        if let Some(first_word) = words.first() {
            variants.push(first_word.chars().take(2).collect());
        }
    }

    variants
}

/// Pick the longest variant that fits `max_chars`.
///
/// Earlier entries win on equal length. When nothing fits, the shortest
/// variant is returned so the caller always has something to truncate.
pub fn fit_name(variants: &[String], max_chars: usize) -> &str {
    let mut best: Option<&String> = None;
    for candidate in variants {
        let len = candidate.chars().count();
        if len > max_chars {
            continue;
        }
        match best {
            Some(current) if current.chars().count() >= len => {}
            _ => best = Some(candidate),
        }
    }

    best.or_else(|| variants.iter().min_by_key(|v| v.chars().count()))
        .map_or("", String::as_str)
}
