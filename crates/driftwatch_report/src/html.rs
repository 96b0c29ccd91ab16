//! HTML rendering of one diff artifact.
//!
//! A thin, dependency-free shell around the Markdown body, matching the
//! original reporting surface: the Markdown is escaped and embedded in a
//! `<pre>` block with a status badge.

use crate::markdown::render_markdown;
use chrono::{DateTime, Utc};
use driftwatch_core::DiffResult;

/// Render the HTML report for one run.
pub fn render_html(result: &DiffResult, generated_at: DateTime<Utc>) -> String {
    let markdown = render_markdown(result, generated_at);
    let title = format!("Schema Drift Report: {}", result.table_id);
    let badge = result
        .overall_severity
        .map(|s| s.to_string())
        .unwrap_or_else(|| result.status.to_string());

    format!(
        r#"<!doctype html>
<html>
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>{title}</title>
  <style>
    body {{
      font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif;
      padding: 24px;
      max-width: 1000px;
      margin: 0 auto;
    }}
    .badge {{
      border: 1px solid #e5e7eb;
      border-radius: 999px;
      padding: 4px 10px;
      font-size: 12px;
    }}
    pre {{
      white-space: pre-wrap;
      word-break: break-word;
      background: #0b1020;
      color: #e6edf3;
      padding: 16px;
      border-radius: 12px;
      overflow: auto;
    }}
  </style>
</head>
<body>
  <h1 style="margin:0;">{title} <span class="badge">{badge}</span></h1>
  <pre>{body}</pre>
</body>
</html>
"#,
        title = escape(&title),
        badge = escape(&badge),
        body = escape(&markdown),
    )
}

/// Minimal HTML escaping for text embedded in the shell.
fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use driftwatch_protocol::{RunId, TableRef};

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn html_embeds_escaped_markdown() {
        let result = DiffResult::no_data(
            TableRef::new("sales", "orders").unwrap(),
            RunId::parse("0000000100-fixedrun").unwrap(),
            None,
        );
        let html = render_html(&result, ts());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("Schema Drift Report: sales.orders"));
        assert!(html.contains("NO_DATA"));
        // markdown heading arrives escaped, not as a tag
        assert!(!html.contains("<h1># "));
    }

    #[test]
    fn escape_covers_html_metacharacters() {
        assert_eq!(escape("<a & \"b\">"), "&lt;a &amp; &quot;b&quot;&gt;");
    }
}
