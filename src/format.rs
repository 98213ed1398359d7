use crate::aggregate::Totals;
use crate::domain::Transaction;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Write as _;

fn currency_prefix(code: &str) -> String {
    match code.to_ascii_uppercase().as_str() {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        other => format!("{other} "),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// `1234.5` in USD becomes `$1,234.50`; negatives get a leading `-`.
pub fn format_currency(value: Decimal, code: &str) -> String {
    let rounded = value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let fixed = format!("{:.2}", rounded.abs());
    let (whole, frac) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!(
        "{sign}{}{}.{frac}",
        currency_prefix(code),
        group_thousands(whole)
    )
}

pub fn format_display_date(raw: &str) -> String {
    match NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => raw.to_string(),
    }
}

pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn escape_markup(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            c => out.push(c),
        }
    }
    out
}

const REPORT_STYLE: &str = r#"
    body { font-family: Arial, sans-serif; margin: 24px; color: #222; }
    h1 { margin-bottom: 4px; }
    .generated { color: #666; margin-bottom: 16px; }
    .summary p { margin: 4px 0; }
    table { width: 100%; border-collapse: collapse; margin-top: 16px; }
    th, td { border: 1px solid #ccc; padding: 6px 8px; text-align: left; }
    th { background: #f2f2f2; }
    .income { color: #2e7d32; }
    .expense { color: #c62828; }
"#;

/// Standalone printable HTML page. Every user-supplied string is escaped.
pub fn render_report_document(
    heading: &str,
    generated_at: NaiveDateTime,
    totals: &Totals,
    transactions: &[Transaction],
    currency: &str,
) -> String {
    let heading = escape_markup(heading);
    let mut rows = String::new();
    if transactions.is_empty() {
        rows.push_str("        <tr><td colspan=\"5\">No transactions for this period</td></tr>\n");
    }
    for t in transactions {
        let _ = writeln!(
            rows,
            "        <tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td></tr>",
            escape_markup(&format_display_date(&t.date.format("%Y-%m-%d").to_string())),
            escape_markup(&t.description),
            escape_markup(&t.category),
            t.kind.as_str(),
            capitalize(t.kind.as_str()),
            escape_markup(&format_currency(t.amount, currency)),
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{heading}</title>
  <style>{REPORT_STYLE}</style>
</head>
<body>
  <h1>{heading}</h1>
  <div class="generated">Generated on {generated}</div>
  <div class="summary">
    <p><strong>Total Income:</strong> {income}</p>
    <p><strong>Total Expense:</strong> {expense}</p>
    <p><strong>Balance:</strong> {balance}</p>
  </div>
  <table>
    <thead>
      <tr><th>Date</th><th>Description</th><th>Category</th><th>Type</th><th>Amount</th></tr>
    </thead>
    <tbody>
{rows}    </tbody>
  </table>
  <script>
    window.onload = function () {{ window.print(); }};
    window.onafterprint = function () {{ window.close(); }};
  </script>
</body>
</html>
"#,
        generated = generated_at.format("%b %-d, %Y %H:%M"),
        income = escape_markup(&format_currency(totals.income, currency)),
        expense = escape_markup(&format_currency(totals.expense, currency)),
        balance = escape_markup(&format_currency(totals.balance, currency)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::totals;
    use crate::domain::TransactionDraft;

    fn dec(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[test]
    fn currency_has_grouping_and_two_decimals() {
        assert_eq!(format_currency(dec("1234.5"), "USD"), "$1,234.50");
        assert_eq!(format_currency(dec("0"), "USD"), "$0.00");
        assert_eq!(format_currency(dec("1000000"), "usd"), "$1,000,000.00");
        assert_eq!(format_currency(dec("999.999"), "USD"), "$1,000.00");
        assert_eq!(format_currency(dec("-50"), "USD"), "-$50.00");
        assert_eq!(format_currency(dec("12.345"), "EUR"), "€12.35");
        assert_eq!(format_currency(dec("7"), "CHF"), "CHF 7.00");
    }

    #[test]
    fn display_date_falls_back_to_raw_text() {
        assert_eq!(format_display_date("2024-01-15"), "Jan 15, 2024");
        assert_eq!(format_display_date("2024-12-05"), "Dec 5, 2024");
        assert_eq!(format_display_date("someday"), "someday");
        assert_eq!(format_display_date(""), "");
    }

    #[test]
    fn capitalize_touches_only_first_char() {
        assert_eq!(capitalize("income"), "Income");
        assert_eq!(capitalize("eXPENSE"), "EXPENSE");
        assert_eq!(capitalize(""), "");
        assert_eq!(capitalize("éclair"), "Éclair");
    }

    #[test]
    fn escapes_all_markup_characters() {
        assert_eq!(
            escape_markup("<b>&\"'"),
            "&lt;b&gt;&amp;&quot;&#039;"
        );
        assert_eq!(escape_markup("plain"), "plain");
    }

    #[test]
    fn report_lists_rows_and_escapes_user_text() {
        let list = vec![
            TransactionDraft {
                kind: "expense".into(),
                amount: "40".into(),
                description: "<script>alert(1)</script>".into(),
                category: "Food & Drink".into(),
                date: "2024-01-15".into(),
            }
            .validate()
            .unwrap(),
        ];
        let generated = NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(9, 5, 0)
            .unwrap();
        let doc = render_report_document(
            "Weekly Report",
            generated,
            &totals(&list),
            &list,
            "USD",
        );

        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<h1>Weekly Report</h1>"));
        assert!(doc.contains("Generated on Jan 17, 2024 09:05"));
        assert!(doc.contains("<strong>Total Expense:</strong> $40.00"));
        assert!(doc.contains("<strong>Balance:</strong> -$40.00"));
        assert!(doc.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
        assert!(!doc.contains("<script>alert(1)"));
        assert!(doc.contains("Food &amp; Drink"));
        assert!(doc.contains("<td>Jan 15, 2024</td>"));
        assert!(doc.contains(">Expense</td>"));
        assert!(!doc.contains("No transactions"));
    }

    #[test]
    fn empty_report_has_placeholder_row() {
        let generated = NaiveDate::from_ymd_opt(2024, 1, 17)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let doc = render_report_document("Monthly Report", generated, &Totals::default(), &[], "USD");
        assert!(doc.contains("No transactions for this period"));
        assert!(doc.contains("<strong>Total Income:</strong> $0.00"));
    }
}
