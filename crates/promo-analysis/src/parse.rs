//! Parsing of the model's `label: value` analysis into [`ProductInfo`].

use promo_models::ProductInfo;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    ProductName,
    TargetAudience,
    Catchphrase,
    Benefit1,
    Benefit2,
    Offer,
    CtaText,
}

/// Accepted spellings per field, compared after [`normalize_label`].
const LABELS: &[(Field, &[&str])] = &[
    (
        Field::ProductName,
        &["product name", "product/brand name", "brand name", "商材/ブランド名", "商材名"],
    ),
    (
        Field::TargetAudience,
        &["target audience", "main target", "メインターゲット"],
    ),
    (Field::Catchphrase, &["catchphrase", "catch copy", "キャッチコピー"]),
    (Field::Benefit1, &["benefit 1", "benefit1", "ベネフィット1"]),
    (Field::Benefit2, &["benefit 2", "benefit2", "ベネフィット2"]),
    (Field::Offer, &["offer", "オファー"]),
    (Field::CtaText, &["cta text", "cta", "ctaテキスト"]),
];

/// Extract the seven copy elements from the model output.
///
/// Lines that do not carry a known label are ignored. The first non-empty
/// value for a label wins.
pub fn parse_analysis(text: &str) -> ProductInfo {
    let mut info = ProductInfo::default();

    for line in text.lines() {
        let Some((label, value)) = split_label(line) else {
            continue;
        };
        let Some(field) = field_for(&normalize_label(label)) else {
            continue;
        };
        let value = clean_value(value);
        if value.is_empty() {
            continue;
        }

        let slot = match field {
            Field::ProductName => &mut info.product_name,
            Field::TargetAudience => &mut info.target_audience,
            Field::Catchphrase => &mut info.catchphrase,
            Field::Benefit1 => &mut info.benefit1,
            Field::Benefit2 => &mut info.benefit2,
            Field::Offer => &mut info.offer,
            Field::CtaText => &mut info.cta_text,
        };
        if slot.is_none() {
            *slot = Some(value);
        }
    }

    info
}

/// Split on the first ASCII or full-width colon.
fn split_label(line: &str) -> Option<(&str, &str)> {
    let idx = line.find([':', '：'])?;
    let sep_len = line[idx..].chars().next()?.len_utf8();
    Some((&line[..idx], &line[idx + sep_len..]))
}

/// Lower-case and strip list markers, numbering and emphasis.
fn normalize_label(label: &str) -> String {
    let label = label
        .trim()
        .trim_start_matches(|c: char| c == '-' || c == '*' || c == '#' || c == '•' || c.is_whitespace());
    let label = match label.split_once(". ") {
        Some((num, rest)) if num.chars().all(|c| c.is_ascii_digit()) => rest,
        _ => label,
    };
    label
        .trim_matches(|c: char| c == '*' || c == '[' || c == ']' || c.is_whitespace())
        .to_lowercase()
}

fn field_for(label: &str) -> Option<Field> {
    LABELS
        .iter()
        .find(|(_, aliases)| aliases.contains(&label))
        .map(|(field, _)| *field)
}

fn clean_value(value: &str) -> String {
    value
        .trim()
        .trim_matches(|c: char| c == '*' || c.is_whitespace())
        .trim_start_matches('[')
        .trim_end_matches(']')
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_english_labels() {
        let text = "Here is the analysis:\n\
            Product name: Acme Cloud\n\
            Target audience: Small business owners\n\
            Catchphrase: Bookkeeping in 5 minutes a day\n\
            Benefit 1: Automatic bank sync\n\
            Benefit 2: Tax-ready reports\n\
            Offer: 30-day free trial\n\
            CTA text: Start free";

        let info = parse_analysis(text);
        assert_eq!(info.product_name.as_deref(), Some("Acme Cloud"));
        assert_eq!(info.target_audience.as_deref(), Some("Small business owners"));
        assert_eq!(info.catchphrase.as_deref(), Some("Bookkeeping in 5 minutes a day"));
        assert_eq!(info.benefit1.as_deref(), Some("Automatic bank sync"));
        assert_eq!(info.benefit2.as_deref(), Some("Tax-ready reports"));
        assert_eq!(info.offer.as_deref(), Some("30-day free trial"));
        assert_eq!(info.cta_text.as_deref(), Some("Start free"));
        assert_eq!(info.filled_count(), 7);
    }

    #[test]
    fn test_parse_japanese_labels_and_fullwidth_colon() {
        let text = "商材/ブランド名：アクメ会計\nCTAテキスト: 無料で試す\nオファー: 特に指定なし";
        let info = parse_analysis(text);
        assert_eq!(info.product_name.as_deref(), Some("アクメ会計"));
        assert_eq!(info.cta_text.as_deref(), Some("無料で試す"));
        assert_eq!(info.offer.as_deref(), Some("特に指定なし"));
    }

    #[test]
    fn test_parse_markdown_decorations() {
        let text = "1. **Product name**: [Acme]\n- **Offer:** 20% off\n* Benefit 2 - no colon here";
        let info = parse_analysis(text);
        assert_eq!(info.product_name.as_deref(), Some("Acme"));
        assert_eq!(info.offer.as_deref(), Some("20% off"));
        assert!(info.benefit2.is_none());
    }

    #[test]
    fn test_first_value_wins_and_blanks_skipped() {
        let text = "Catchphrase:\nCatchphrase: Fast\nCatchphrase: Slow\nTime: 12:00";
        let info = parse_analysis(text);
        assert_eq!(info.catchphrase.as_deref(), Some("Fast"));
        assert_eq!(info.filled_count(), 1);
    }

    #[test]
    fn test_unrelated_text() {
        assert!(parse_analysis("I could not read the page.").is_empty());
    }
}
