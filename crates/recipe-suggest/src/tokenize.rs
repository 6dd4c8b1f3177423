/// Ingredient text tokenization and whole-word matching.
///
/// Tokens are lowercase word characters split on any run of
/// non-word characters. Order follows first occurrence and
/// duplicates are kept; downstream counts each token once anyway.
pub fn tokenize(raw: &str) -> Vec<String> {
    raw.to_lowercase()
        .split(|c: char| !is_word_char(c))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Singular/plural variants of a token: the token itself, +s, +es,
/// y->ies and back, and singular guesses with trailing s/es stripped.
pub fn token_variants(tok: &str) -> Vec<String> {
    let mut variants = vec![tok.to_string(), format!("{tok}s"), format!("{tok}es")];
    if let Some(stem) = tok.strip_suffix('y') {
        variants.push(format!("{stem}ies"));
    }
    if let Some(stem) = tok.strip_suffix("ies") {
        variants.push(format!("{stem}y"));
    }
    if tok.len() > 1 {
        if let Some(stem) = tok.strip_suffix('s') {
            variants.push(stem.to_string());
        }
        if let Some(stem) = tok.strip_suffix("es") {
            variants.push(stem.to_string());
        }
    }
    variants.dedup();
    variants
}

/// Whole-word search for a token in free text, accepting simple
/// singular/plural variants. Punctuation acts as a word boundary.
pub fn token_in_text(tok: &str, text: &str) -> bool {
    let variants = token_variants(tok);
    words_of(text).any(|w| variants.iter().any(|v| *v == w))
}

/// Whole-word search without variant expansion, used for name and
/// short-description fallback matching.
pub fn word_in_text(tok: &str, text: &str) -> bool {
    words_of(text).any(|w| w == tok)
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !is_word_char(c))
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
}
