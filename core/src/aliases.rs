//! Column aliases — `key=Title, other=Title` display-name overrides.

use std::collections::HashMap;

/// Parse an alias string leniently. Pairs without `=` and pairs with a
/// blank key or value are skipped; later duplicates win.
pub fn parse_aliases(text: &str) -> HashMap<String, String> {
    text.split(',')
        .map(str::trim)
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim(), value.trim()))
        .filter(|(key, value)| !key.is_empty() && !value.is_empty())
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// Display title for each column: its alias, or the column name itself.
pub fn column_titles(columns: &[String], aliases: &HashMap<String, String>) -> Vec<String> {
    columns
        .iter()
        .map(|c| aliases.get(c).unwrap_or(c).clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pairs_and_skips_malformed_ones() {
        let aliases = parse_aliases("amount=Сумма, rating=Рейтинг, broken, =x, y=, status = Статус");
        assert_eq!(aliases.len(), 3);
        assert_eq!(aliases["amount"], "Сумма");
        assert_eq!(aliases["rating"], "Рейтинг");
        assert_eq!(aliases["status"], "Статус");
    }

    #[test]
    fn later_duplicates_win_and_values_keep_extra_equals() {
        let aliases = parse_aliases("a=First, a=Second, b=x=y");
        assert_eq!(aliases["a"], "Second");
        assert_eq!(aliases["b"], "x=y");
    }

    #[test]
    fn blank_text_yields_no_aliases() {
        assert!(parse_aliases("   ").is_empty());
    }

    #[test]
    fn titles_fall_back_to_column_names() {
        let columns = vec!["id".to_string(), "amount".to_string(), "amount".to_string()];
        let aliases = parse_aliases("amount=Сумма");
        assert_eq!(column_titles(&columns, &aliases), ["id", "Сумма", "Сумма"]);
    }
}
