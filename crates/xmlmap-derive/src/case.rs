//! Naming conventions accepted by `#[xml(rename_all = "...")]`.

use syn::LitStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RenameRule {
    PascalCase,
    CamelCase,
    SnakeCase,
    KebabCase,
    ScreamingSnakeCase,
}

impl RenameRule {
    pub(crate) fn from_lit(lit: &LitStr) -> syn::Result<Self> {
        match lit.value().as_str() {
            "PascalCase" => Ok(RenameRule::PascalCase),
            "camelCase" => Ok(RenameRule::CamelCase),
            "snake_case" => Ok(RenameRule::SnakeCase),
            "kebab-case" => Ok(RenameRule::KebabCase),
            "SCREAMING_SNAKE_CASE" => Ok(RenameRule::ScreamingSnakeCase),
            other => Err(syn::Error::new(
                lit.span(),
                format!(
                    "unknown rename rule `{other}`, expected one of PascalCase, camelCase, \
                     snake_case, kebab-case, SCREAMING_SNAKE_CASE"
                ),
            )),
        }
    }

    pub(crate) fn apply(self, name: &str) -> String {
        let words = split_words(name);
        match self {
            RenameRule::PascalCase => words.iter().map(|word| capitalize(word)).collect(),
            RenameRule::CamelCase => words
                .iter()
                .enumerate()
                .map(|(i, word)| if i == 0 { word.to_lowercase() } else { capitalize(word) })
                .collect(),
            RenameRule::SnakeCase => join_lower(&words, "_"),
            RenameRule::KebabCase => join_lower(&words, "-"),
            RenameRule::ScreamingSnakeCase => join_lower(&words, "_").to_uppercase(),
        }
    }
}

/// Split an identifier on underscores and lower-to-upper case changes.
fn split_words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in name.chars() {
        if c == '_' || c == '-' {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn join_lower(words: &[String], separator: &str) -> String {
    words
        .iter()
        .map(|word| word.to_lowercase())
        .collect::<Vec<_>>()
        .join(separator)
}

/// Name of the generated `FieldKey` constant for a field.
pub(crate) fn const_name(field: &str) -> String {
    RenameRule::ScreamingSnakeCase.apply(field)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_snake_case_fields() {
        assert_eq!(RenameRule::PascalCase.apply("double_prop"), "DoubleProp");
        assert_eq!(RenameRule::CamelCase.apply("double_prop"), "doubleProp");
        assert_eq!(RenameRule::KebabCase.apply("double_prop"), "double-prop");
        assert_eq!(RenameRule::ScreamingSnakeCase.apply("double_prop"), "DOUBLE_PROP");
        assert_eq!(RenameRule::SnakeCase.apply("double_prop"), "double_prop");
    }

    #[test]
    fn splits_mixed_case_identifiers() {
        assert_eq!(split_words("PropWithSpecifiedAttributeName").len(), 5);
        assert_eq!(const_name("DoubleProp"), "DOUBLE_PROP");
        assert_eq!(const_name("price2_usd"), "PRICE2_USD");
        assert_eq!(const_name("URL"), "URL");
    }

    #[test]
    fn rejects_unknown_rules() {
        let lit: LitStr = syn::parse_quote!("Title Case");
        assert!(RenameRule::from_lit(&lit).is_err());
        let lit: LitStr = syn::parse_quote!("kebab-case");
        assert_eq!(RenameRule::from_lit(&lit).ok(), Some(RenameRule::KebabCase));
    }
}
