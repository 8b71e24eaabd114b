//! HTML pages. The input page is static; the result page is filled from an [`Analysis`].

use eye_common::diagnosis::DiagnosticRecord;

use crate::session::Analysis;

pub const INDEX_HTML: &str = include_str!("../templates/index.html");

/// Render the result page. With no analysis the fields render empty and no image is shown.
pub fn render_result(analysis: Option<&Analysis>) -> String {
    let record = analysis.map(|a| &a.record);

    let image = analysis
        .map(|a| {
            format!(
                r#"<img src="{}" alt="Analyzed eye image" class="eye">"#,
                escape_html(&a.image_url)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>Analysis Result</title>
  <style>
    body {{ font-family: system-ui, sans-serif; max-width: 720px; margin: 2rem auto; padding: 0 1rem; }}
    img.eye {{ max-width: 100%; border-radius: 8px; }}
    .disclaimer {{ color: #a33; font-size: 0.9rem; }}
  </style>
</head>
<body>
  <h1>Analysis Result</h1>
  {image}
  <h2>Diagnosis</h2>
  <p class="diagnosis">{diagnosis}</p>
  <h2>Description</h2>
  <p>{description}</p>
  <h2>Symptoms</h2>
  <p>{symptoms}</p>
  <h2>Home Remedies</h2>
  {remedies}
  <h2>Medicines</h2>
  {medicines}
  <p class="disclaimer">{disclaimer}</p>
  <p><a href="/">Analyze another image</a></p>
</body>
</html>
"#,
        diagnosis = text_field(record, |r| r.diagnosis.as_str()),
        description = text_field(record, |r| r.description.as_str()),
        symptoms = text_field(record, |r| r.symptoms.as_str()),
        remedies = render_list(record.map(|r| r.home_remedies.as_slice())),
        medicines = render_list(record.map(|r| r.medicines.as_slice())),
        disclaimer = text_field(record, |r| r.disclaimer.as_str()),
    )
}

fn text_field(
    record: Option<&DiagnosticRecord>,
    get: impl Fn(&DiagnosticRecord) -> &str,
) -> String {
    record.map(|r| escape_html(get(r))).unwrap_or_default()
}

fn render_list(items: Option<&[String]>) -> String {
    let items = items.unwrap_or_default();
    let mut out = String::from("<ul>");
    for item in items {
        out.push_str("<li>");
        out.push_str(&escape_html(item));
        out.push_str("</li>");
    }
    out.push_str("</ul>");
    out
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
