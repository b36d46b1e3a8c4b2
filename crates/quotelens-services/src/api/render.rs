//! HTML pages for the browser upload flow.

use std::fmt::Write;

use quotelens_types::{Prediction, QuoteLensError};

const STYLE: &str = "body{font-family:sans-serif;max-width:46rem;margin:3rem auto;padding:0 1rem}\
.positive{color:#1a7f37}.negative{color:#9a6700}.error{color:#cf222e}";

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n{body}</body>\n</html>\n"
    )
}

/// Escape text for HTML element content and attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// The upload form.
pub fn upload_form() -> String {
    page(
        "Quote conversion",
        "<h1>Quote conversion</h1>\n\
         <p>Upload a CSV of quotes to predict whether each customer will buy the quoted plan.</p>\n\
         <form action=\"/data\" method=\"post\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"file\" accept=\".csv,text/csv\" required>\n\
         <button type=\"submit\">Predict</button>\n\
         </form>\n",
    )
}

/// One verdict line per scored record.
pub fn result_page(predictions: &[Prediction]) -> String {
    let mut body = String::from("<h1>Prediction</h1>\n<ul>\n");
    for p in predictions {
        let class = if p.is_positive() { "positive" } else { "negative" };
        let quote = p
            .quote_number
            .as_deref()
            .map(|q| format!("Quote {}: ", escape(q)))
            .unwrap_or_default();
        let _ = writeln!(
            body,
            "<li class=\"{class}\">{quote}{} <small>(p = {:.3})</small></li>",
            escape(&p.verdict),
            p.probability
        );
    }
    body.push_str("</ul>\n<p><a href=\"/\">Score another file</a></p>\n");
    page("Prediction", &body)
}

/// A rejected upload.
pub fn error_page(err: &QuoteLensError) -> String {
    let body = format!(
        "<h1>Could not score this file</h1>\n<p class=\"error\">{}</p>\n\
         <p><a href=\"/\">Try another file</a></p>\n",
        escape(&err.to_string())
    );
    page("Error", &body)
}
