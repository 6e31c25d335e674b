//! Index: the page served when no prefix matches.

use axum::response::Html;

use super::routes::RoutingTable;

pub fn render(table: &RoutingTable) -> Html<String> {
    let mut page = String::from(
        "<!DOCTYPE html>\n<html>\n<head><title>Harbour</title></head>\n<body>\n<h1>Harbour</h1>\n<ul>\n",
    );
    for prefix in table.prefixes() {
        let prefix = escape(prefix);
        page.push_str(&format!("<li><a href=\"{0}\">{0}</a></li>\n", prefix));
    }
    page.push_str("</ul>\n</body>\n</html>\n");
    Html(page)
}

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
