//! Static form and the HTML results page

use crate::calendar::display_date;
use crate::request::RateRequest;
use crate::table::RateTable;
use std::fmt::Write;

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>NBU exchange rates</title>
</head>
<body>
  <h1>NBU exchange rates</h1>
  <form method="post" action="/generate">
    <label>Currencies <input name="currencies" value="USD,EUR" required></label>
    <label>Start date <input type="date" name="start_date" required></label>
    <label>End date <input type="date" name="end_date" required></label>
    <button type="submit">Generate</button>
  </form>
</body>
</html>
"#;

/// Results table with links to the spreadsheet and a CSV rendition
pub fn results_page(
    request: &RateRequest,
    table: &RateTable,
    file_name: &str,
    time_taken: f64,
) -> String {
    let mut html = String::from(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n  <meta charset=\"utf-8\">\n  <title>NBU exchange rates</title>\n</head>\n<body>\n",
    );

    let _ = writeln!(html, "<p>Generated in {:.2}s</p>", time_taken);
    html.push_str("<table>\n<tr>");
    for header in table.headers() {
        let _ = write!(html, "<th>{}</th>", escape_html(&header));
    }
    html.push_str("</tr>\n");
    for row in table.string_rows() {
        html.push_str("<tr>");
        for cell in row {
            let _ = write!(html, "<td>{}</td>", escape_html(&cell));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table>\n");

    let codes: Vec<&str> = request.currencies().iter().map(|c| c.as_str()).collect();
    let _ = writeln!(
        html,
        "<p><a href=\"/download?file_name={}\">Download {}</a></p>",
        escape_html(file_name),
        escape_html(file_name)
    );
    let _ = writeln!(
        html,
        "<p><a href=\"/download?currencies={}&amp;start_date={}&amp;end_date={}\">Download CSV</a></p>",
        codes.join(","),
        display_date(request.start()),
        display_date(request.end())
    );
    html.push_str("</body>\n</html>\n");
    html
}

fn escape_html(raw: &str) -> String {
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
