use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Case- and accent-insensitive form of `text`.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .nfc()
        .flat_map(char::to_lowercase)
        .collect()
}

/// Folded alphanumeric runs of `text`. `"SQ01_sh-010"` -> `["sq01", "sh", "010"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    fold(text)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Increment the last character of a string to get the exclusive upper bound
/// of every string starting with `s`.
pub fn increment_string(s: &str) -> Option<String> {
    let mut chars: Vec<char> = s.chars().collect();
    for i in (0..chars.len()).rev() {
        if let Some(next_char) = char::from_u32(chars[i] as u32 + 1) {
            chars[i] = next_char;
            return Some(chars[..=i].iter().collect());
        }
    }
    None
}
