use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Fold text for locale-independent matching: upper case, accents stripped,
/// whitespace collapsed. `"Folha  Líquida"` becomes `"FOLHA LIQUIDA"`.
pub fn fold_text(input: &str) -> String {
    let upper = input.to_uppercase();
    let mut out = String::with_capacity(upper.len());
    for ch in upper.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        if ch == '_' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_text_strips_accents_and_case() {
        assert_eq!(fold_text("Março"), "MARCO");
        assert_eq!(fold_text("Folha_Líquida"), "FOLHA LIQUIDA");
        assert_eq!(fold_text("  contribuição   sindical "), "CONTRIBUICAO SINDICAL");
        assert_eq!(fold_text("Período"), "PERIODO");
    }

    #[test]
    fn test_fold_text_empty() {
        assert_eq!(fold_text(""), "");
        assert_eq!(fold_text("   "), "");
    }
}
