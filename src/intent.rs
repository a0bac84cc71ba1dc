use regex::Regex;

/// Phrases that mark a message as a request to put something on the map.
const LOCATION_KEYWORDS: [&str; 4] = ["show", "where is", "locate", "find"];

lazy_static::lazy_static! {
    // Leftmost-first alternation over raw substrings, not whole words: "Finders Creek"
    // loses its "find" too. Place names containing these fragments come out mangled.
    static ref FILLER: Regex =
        Regex::new(r"(show|where is|locate|find|me|please|can you|display|on the map)")
            .expect("filler pattern is a valid regex");
}

/// Check whether a message is asking for a location on the map.
pub fn is_location_intent(message: &str) -> bool {
    let lowercase = message.to_lowercase();
    LOCATION_KEYWORDS
        .iter()
        .any(|keyword| lowercase.contains(keyword))
}

/// Strip filler phrases from a message, leaving the place name to geocode.
///
/// The result is lowercase and trimmed, e.g. `"Show me Shailer Park"` becomes
/// `"shailer park"`.
pub fn derive_location_query(message: &str) -> String {
    let lowercase = message.to_lowercase();
    FILLER.replace_all(&lowercase, "").trim().to_string()
}

/// Capitalize the first letter of each alphabetic run and lowercase the rest.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
