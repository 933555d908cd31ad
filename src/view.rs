//! Presentation - the single page, its list fragment, and form state
//!
//! The list region has three observable states:
//! - loading (`None`): nothing rendered
//! - loaded, empty: a placeholder message
//! - loaded, non-empty: one row per record with a link, date, and delete control

use chrono::{DateTime, Utc};

use crate::record::{UrlId, UrlRecord};
use crate::service::UrlOperations;

pub const TITLE: &str = "URL Summarizer";
pub const SUBTITLE: &str = "Store and manage your URLs here";
pub const INPUT_PLACEHOLDER: &str = "Enter a URL (e.g., https://example.com)";
pub const EMPTY_MESSAGE: &str = "No URLs yet. Add one to get started!";

/// Transient state of the submission form.
#[derive(Debug, Default, Clone)]
pub struct UrlForm {
    input: String,
}

impl UrlForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, text: impl Into<String>) {
        self.input = text.into();
    }

    /// Submit the current input.
    ///
    /// Whitespace-only input is ignored without calling `add`. On success the
    /// input is cleared; on failure it is kept and the error is logged.
    pub fn submit<O: UrlOperations + ?Sized>(&mut self, ops: &O) -> Option<UrlId> {
        if self.input.trim().is_empty() {
            return None;
        }

        match ops.add(&self.input) {
            Ok(id) => {
                self.input.clear();
                Some(id)
            }
            Err(e) => {
                tracing::error!("Error adding URL: {}", e);
                None
            }
        }
    }
}

/// Delete control for one record; failures are logged, not surfaced.
pub fn delete_record<O: UrlOperations + ?Sized>(ops: &O, id: &UrlId) -> bool {
    match ops.delete(id) {
        Ok(()) => true,
        Err(e) => {
            tracing::error!("Error deleting URL: {}", e);
            false
        }
    }
}

/// "Added 1/15/2024"
pub fn format_added(created_at: &DateTime<Utc>) -> String {
    format!("Added {}", created_at.format("%-m/%-d/%Y"))
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
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

/// Only http(s) urls become clickable; anything else is stored as given but
/// shown as text.
fn is_web_link(url: &str) -> bool {
    let url = url.trim_start();
    ["http://", "https://"].iter().any(|scheme| {
        url.get(..scheme.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(scheme))
    })
}

/// Render the list region's contents
pub fn render_list(urls: Option<&[UrlRecord]>) -> String {
    let Some(urls) = urls else {
        return String::new();
    };

    if urls.is_empty() {
        return format!("<p class=\"empty\">{}</p>\n", EMPTY_MESSAGE);
    }

    let mut out = String::new();
    for record in urls {
        let id = record.id.to_string();
        let url = escape_html(&record.url);

        out.push_str("<div class=\"item\">\n");
        out.push_str("  <div class=\"item-body\">\n");
        if is_web_link(&record.url) {
            out.push_str(&format!(
                "    <a href=\"{url}\" target=\"_blank\" rel=\"noopener noreferrer\">{url}</a>\n"
            ));
        } else {
            out.push_str(&format!("    <span class=\"url\">{url}</span>\n"));
        }
        out.push_str(&format!(
            "    <p class=\"added\">{}</p>\n",
            format_added(&record.created_at)
        ));
        out.push_str("  </div>\n");
        out.push_str(&format!(
            "  <form method=\"post\" action=\"/urls/{id}/delete\" class=\"delete\" data-id=\"{id}\">\
             <button type=\"submit\">Delete</button></form>\n"
        ));
        out.push_str("</div>\n");
    }
    out
}

/// Render the full page, with the list region pre-filled when available
pub fn render_page(urls: Option<&[UrlRecord]>) -> String {
    let mut out = String::new();
    out.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    out.push_str("<meta charset=\"utf-8\">\n");
    out.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    out.push_str(&format!("<title>{TITLE}</title>\n"));
    out.push_str(STYLE);
    out.push_str("</head>\n<body>\n<main>\n");
    out.push_str(&format!("<h1>{TITLE}</h1>\n<p class=\"subtitle\">{SUBTITLE}</p>\n"));
    out.push_str(&format!(
        "<form id=\"add-form\" method=\"post\" action=\"/urls\">\n\
         <input id=\"url-input\" type=\"text\" name=\"url\" placeholder=\"{}\" autocomplete=\"off\">\n\
         <button type=\"submit\">Add URL</button>\n</form>\n",
        escape_html(INPUT_PLACEHOLDER)
    ));
    out.push_str("<div id=\"urls\">\n");
    out.push_str(&render_list(urls));
    out.push_str("</div>\n</main>\n");
    out.push_str(SCRIPT);
    out.push_str("</body>\n</html>\n");
    out
}

const STYLE: &str = r#"<style>
body { margin: 0; min-height: 100vh; font-family: system-ui, sans-serif; background: linear-gradient(135deg, #eff6ff, #e0e7ff); }
main { max-width: 42rem; margin: 0 auto; padding: 2rem; }
h1 { font-size: 2.25rem; color: #111827; margin: 0 0 .5rem; }
.subtitle { color: #4b5563; margin: 0 0 2rem; }
#add-form { display: flex; gap: .5rem; margin-bottom: 2rem; }
#url-input { flex: 1; padding: .75rem 1rem; border: 1px solid #d1d5db; border-radius: .5rem; }
#add-form button { padding: .75rem 1.5rem; background: #4f46e5; color: #fff; border: 0; border-radius: .5rem; font-weight: 500; }
.empty { color: #6b7280; text-align: center; padding: 2rem 0; }
.item { background: #fff; border-radius: .5rem; box-shadow: 0 1px 3px rgba(0,0,0,.1); padding: 1rem; margin-bottom: .75rem; display: flex; align-items: center; justify-content: space-between; }
.item-body { flex: 1; min-width: 0; }
.item .url { color: #6b7280; font-weight: 500; display: block; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.item a { color: #4f46e5; font-weight: 500; display: block; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.added { font-size: .875rem; color: #6b7280; margin: .25rem 0 0; }
.delete button { margin-left: 1rem; padding: .5rem .75rem; color: #dc2626; background: none; border: 0; border-radius: .25rem; font-weight: 500; cursor: pointer; }
</style>
"#;

const SCRIPT: &str = r#"<script>
(function () {
  var list = document.getElementById("urls");
  var form = document.getElementById("add-form");
  var input = document.getElementById("url-input");

  var source = new EventSource("/live");
  source.addEventListener("urls", function (e) { list.innerHTML = e.data; });

  form.addEventListener("submit", async function (e) {
    e.preventDefault();
    if (!input.value.trim()) return;
    try {
      var res = await fetch("/api/urls", {
        method: "POST",
        headers: { "Content-Type": "application/json" },
        body: JSON.stringify({ url: input.value })
      });
      if (!res.ok) throw new Error((await res.json()).error);
      input.value = "";
    } catch (err) {
      console.error("Error adding URL:", err);
    }
  });

  list.addEventListener("submit", async function (e) {
    var target = e.target;
    if (!target.classList.contains("delete")) return;
    e.preventDefault();
    try {
      var res = await fetch("/api/urls/" + target.dataset.id, { method: "DELETE" });
      if (!res.ok) throw new Error((await res.json()).error);
    } catch (err) {
      console.error("Error deleting URL:", err);
    }
  });
})();
</script>
"#;
