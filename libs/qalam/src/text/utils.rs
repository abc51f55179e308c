use crate::image2text::ScriptHint;

/// Single Latin letters that are real words.
const LATIN_SINGLE_WORDS: [&str; 2] = ["a", "i"];

fn is_arabic(c: char) -> bool {
    ('\u{0600}'..='\u{06FF}').contains(&c)
}

fn is_latin_alnum(c: char) -> bool {
    c.is_ascii_alphanumeric()
}

/// True when nothing in the token is a letter or a digit.
fn is_symbol_only(token: &str) -> bool {
    !token.chars().any(char::is_alphanumeric)
}

/// Script-aware character-class check for a single token.
pub fn is_valid_token(token: &str, hint: ScriptHint) -> bool {
    if token.is_empty() || is_symbol_only(token) {
        return false;
    }

    match hint {
        ScriptHint::Latin => token.chars().any(is_latin_alnum),
        ScriptHint::Arabic => token.chars().any(is_arabic),
        ScriptHint::Mixed => token.chars().any(|c| is_latin_alnum(c) || is_arabic(c)),
    }
}

fn passes_length_rule(token: &str, hint: ScriptHint) -> bool {
    let mut chars = token.chars();
    let (Some(only), None) = (chars.next(), chars.next()) else {
        return true;
    };

    let latin_word = matches!(hint, ScriptHint::Latin | ScriptHint::Mixed)
        && LATIN_SINGLE_WORDS.contains(&token.to_lowercase().as_str());
    let arabic_letter = matches!(hint, ScriptHint::Arabic | ScriptHint::Mixed) && is_arabic(only);

    latin_word || arabic_letter
}

/// Drops recognition noise and rejoins the surviving tokens with single spaces.
///
/// Pure function of its inputs; running it over its own output changes nothing.
pub fn clean(raw: &str, hint: ScriptHint) -> String {
    raw.split_whitespace()
        .filter(|token| is_valid_token(token, hint) && passes_length_rule(token, hint))
        .collect::<Vec<&str>>()
        .join(" ")
}
