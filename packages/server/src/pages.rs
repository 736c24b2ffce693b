//! Server-rendered HTML for the uploads browser.

use std::fmt::Write;

use crate::models::diagnostics::ServerFilesResponse;

/// Escape text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
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

fn format_size(size: Option<u64>) -> String {
    match size {
        None => "unknown".into(),
        Some(bytes) if bytes < 1024 => format!("{bytes} B"),
        Some(bytes) if bytes < 1024 * 1024 => format!("{:.1} KiB", bytes as f64 / 1024.0),
        Some(bytes) => format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0)),
    }
}

/// Render the uploads browser page from a reconciliation report.
pub fn render_uploads_browser(report: &ServerFilesResponse) -> String {
    let mut html = String::new();

    html.push_str(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>Uploads browser</title>\n<link rel=\"stylesheet\" href=\"/styles.css\">\n\
         </head>\n<body class=\"uploads-browser\">\n<h1>Uploads browser</h1>\n\
         <p><a href=\"/\">Back to submissions</a></p>\n",
    );

    let _ = write!(
        html,
        "<section class=\"summary\">\n<p>Storage: <strong>{}</strong>{}</p>\n\
         <p>{} files, {} used, {} unused. {} records, {} with a missing image.</p>\n</section>\n",
        escape_html(&report.storage),
        if report.enumerable {
            ""
        } else {
            " (not enumerable, files derived from records)"
        },
        report.total_files,
        report.used_files,
        report.unused_files,
        report.total_records,
        report.missing_files.len(),
    );

    html.push_str("<h2>Files</h2>\n");
    if report.files.is_empty() {
        html.push_str("<p class=\"empty\">No files stored.</p>\n");
    } else {
        html.push_str("<div class=\"file-grid\">\n");
        for file in &report.files {
            let url = escape_html(&file.url);
            let _ = write!(
                html,
                "<figure class=\"file {}\">\n<a href=\"{url}\"><img src=\"{url}\" alt=\"{name}\" loading=\"lazy\"></a>\n\
                 <figcaption>{name}<br>{size} &middot; {status}</figcaption>\n</figure>\n",
                if file.used { "used" } else { "unused" },
                name = escape_html(&file.name),
                size = format_size(file.size),
                status = if file.used {
                    format!("used by {}", file.record_ids.len())
                } else {
                    "unused".to_string()
                },
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("<h2>Records with missing images</h2>\n");
    if report.missing_files.is_empty() {
        html.push_str("<p class=\"empty\">Every record points at a stored file.</p>\n");
    } else {
        html.push_str("<table class=\"missing\">\n<tr><th>Record</th><th>Image reference</th></tr>\n");
        for missing in &report.missing_files {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(&missing.record_id),
                escape_html(&missing.image_ref),
            );
        }
        html.push_str("</table>\n");
    }

    html.push_str("</body>\n</html>\n");
    html
}
