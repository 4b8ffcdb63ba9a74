//! First paint: turns a rendered tree into static markup so the page is
//! readable before the client script connects and takes over.

use serde::Serialize;
use serde_json::Value;
use shared::protocol::{Element, NavbarConfig, PageTree};
use tracing::warn;

#[derive(Debug, Serialize)]
struct Boot<'a> {
    path: &'a str,
    interactive: bool,
    navbar: Option<&'a NavbarConfig>,
}

pub(crate) fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
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

/// JSON that is safe to inline inside a `<script>` block.
fn script_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

fn text(element: &Element, key: &str) -> String {
    match element.attr(key) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(value)) => value.clone(),
        Some(other) => other.to_string(),
    }
}

fn esc(element: &Element, key: &str) -> String {
    escape_html(&text(element, key))
}

fn strings(element: &Element, key: &str) -> Vec<String> {
    match element.attr(key) {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(value) => value.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

pub fn render_elements(elements: &[Element]) -> String {
    elements
        .iter()
        .map(render_element)
        .collect::<Vec<_>>()
        .join("\n")
}

fn form_group(element: &Element, label: Option<String>, widget: String) -> String {
    let error = element.text("error");
    let class = if error.is_some() {
        "form-group has-error"
    } else {
        "form-group"
    };
    let mut out = format!("<div class=\"{class}\">");
    if let Some(label) = label {
        out.push_str(&format!(
            "<label class=\"form-label\" for=\"{}\">{label}</label>",
            esc(element, "id")
        ));
    }
    out.push_str(&widget);
    if let Some(error) = error {
        out.push_str(&format!(
            "<p class=\"form-input-hint\">{}</p>",
            escape_html(error)
        ));
    }
    out.push_str("</div>");
    out
}

fn labelled(element: &Element, widget: String) -> String {
    form_group(element, Some(esc(element, "label")), widget)
}

fn text_field(element: &Element, input_type: &str) -> String {
    labelled(
        element,
        format!(
            "<input class=\"form-input\" type=\"{input_type}\" id=\"{}\" value=\"{}\">",
            esc(element, "id"),
            esc(element, "value")
        ),
    )
}

fn options(element: &Element, selected: &[String]) -> String {
    strings(element, "options")
        .iter()
        .map(|option| {
            let marker = if selected.contains(option) {
                " selected"
            } else {
                ""
            };
            let option = escape_html(option);
            format!("<option value=\"{option}\"{marker}>{option}</option>")
        })
        .collect()
}

pub fn render_element(element: &Element) -> String {
    let kind = element.kind.as_str();
    if let Some(level) = kind
        .strip_prefix("heading")
        .and_then(|level| level.parse::<u8>().ok())
        .filter(|level| (1..=6).contains(level))
    {
        let id = element
            .id()
            .map(|id| format!(" id=\"{}\"", escape_html(id)))
            .unwrap_or_default();
        return format!("<h{level}{id}>{}</h{level}>", esc(element, "text"));
    }

    match kind {
        "paragraph" => format!("<p>{}</p>", esc(element, "text")),
        "link" => format!(
            "<a href=\"{}\">{}</a>",
            esc(element, "href"),
            esc(element, "text")
        ),
        "divider" => "<div class=\"divider\"></div>".to_string(),
        "code" => {
            let language = element
                .text("language")
                .map(|language| format!(" class=\"language-{}\"", escape_html(language)))
                .unwrap_or_default();
            format!(
                "<pre class=\"code\"><code{language}>{}</code></pre>",
                esc(element, "text")
            )
        }
        "alert" => format!(
            "<div class=\"toast toast-{}\">{}</div>",
            esc(element, "style"),
            esc(element, "text")
        ),
        "image" => {
            let caption = element
                .text("caption")
                .map(|caption| {
                    format!(
                        "<figcaption class=\"figure-caption text-center\">{}</figcaption>",
                        escape_html(caption)
                    )
                })
                .unwrap_or_default();
            format!(
                "<figure class=\"figure\"><img class=\"img-responsive\" src=\"{}\" alt=\"{}\">{caption}</figure>",
                esc(element, "src"),
                esc(element, "caption")
            )
        }
        "latex" => format!("<div class=\"latex\">\\[{}\\]</div>", esc(element, "text")),
        "spinner" => format!(
            "<div class=\"spinner\"><div class=\"loading\"></div><span>{}</span></div>",
            esc(element, "label")
        ),
        "table" => render_table(element),
        "data_table" => format!(
            "<div class=\"data-table\" id=\"{}\"></div>",
            esc(element, "id")
        ),
        "chart" => format!(
            "<div class=\"chart-container\"><canvas id=\"{}\"></canvas></div>",
            esc(element, "id")
        ),
        "button" => format!(
            "<button class=\"btn btn-primary\" id=\"{}\">{}</button>",
            esc(element, "id"),
            esc(element, "text")
        ),
        "text_input" => text_field(element, "text"),
        "password_input" => text_field(element, "password"),
        "number_input" => text_field(element, "text"),
        "date_input" => text_field(element, "date"),
        "date_range_picker" => text_field(element, "text"),
        "textarea" => labelled(
            element,
            format!(
                "<textarea class=\"form-input\" id=\"{}\" rows=\"{}\">{}</textarea>",
                esc(element, "id"),
                esc(element, "rows"),
                esc(element, "value")
            ),
        ),
        "slider" => form_group(
            element,
            Some(format!(
                "{} ({})",
                esc(element, "label"),
                esc(element, "value")
            )),
            format!(
                "<input class=\"slider\" type=\"range\" id=\"{}\" min=\"{}\" max=\"{}\" step=\"{}\" value=\"{}\">",
                esc(element, "id"),
                esc(element, "min"),
                esc(element, "max"),
                esc(element, "step"),
                esc(element, "value")
            ),
        ),
        "checkbox" => {
            let checked = if element.attr("value") == Some(&Value::Bool(true)) {
                " checked"
            } else {
                ""
            };
            form_group(
                element,
                None,
                format!(
                    "<label class=\"form-checkbox\"><input type=\"checkbox\" id=\"{}\"{checked}><i class=\"form-icon\"></i> {}</label>",
                    esc(element, "id"),
                    esc(element, "label")
                ),
            )
        }
        "selectbox" => labelled(
            element,
            format!(
                "<select class=\"form-select\" id=\"{}\">{}</select>",
                esc(element, "id"),
                options(element, &[text(element, "value")])
            ),
        ),
        "multi_select" => labelled(
            element,
            format!(
                "<select class=\"form-select\" multiple id=\"{}\">{}</select>",
                esc(element, "id"),
                options(element, &strings(element, "value"))
            ),
        ),
        "radio_group" => {
            let current = text(element, "value");
            let id = esc(element, "id");
            let radios: String = strings(element, "options")
                .iter()
                .map(|option| {
                    let checked = if *option == current { " checked" } else { "" };
                    let option = escape_html(option);
                    format!(
                        "<label class=\"form-radio\"><input type=\"radio\" name=\"{id}\" value=\"{option}\"{checked}><i class=\"form-icon\"></i> {option}</label>"
                    )
                })
                .collect();
            labelled(element, format!("<div id=\"{id}\">{radios}</div>"))
        }
        "theme_setter" => String::new(),
        "columns_container" => {
            let columns: String = element
                .columns
                .iter()
                .flatten()
                .map(|column| format!("<div class=\"column\">{}</div>", render_elements(column)))
                .collect();
            format!("<div class=\"columns\">{columns}</div>")
        }
        "expander" => {
            let body = render_elements(element.content.as_deref().unwrap_or_default());
            let open = if element.attr("expanded") == Some(&Value::Bool(true)) {
                " open"
            } else {
                ""
            };
            format!(
                "<div class=\"accordion{open}\" id=\"{}\"><div class=\"accordion-header\">{}</div><div class=\"accordion-body\">{body}</div></div>",
                esc(element, "id"),
                esc(element, "label")
            )
        }
        "form_group" => format!(
            "<fieldset class=\"form-group\"><legend>{}</legend>{}</fieldset>",
            esc(element, "label"),
            render_elements(element.content.as_deref().unwrap_or_default())
        ),
        "tabs" => {
            let active = text(element, "active_tab");
            let items: String = strings(element, "labels")
                .iter()
                .map(|label| {
                    let class = if *label == active {
                        "tab-item active"
                    } else {
                        "tab-item"
                    };
                    format!("<li class=\"{class}\"><a href=\"#\">{}</a></li>", escape_html(label))
                })
                .collect();
            format!(
                "<div class=\"tabs-container\" id=\"{}\"><ul class=\"tab\">{items}</ul><div class=\"tab-content\">{}</div></div>",
                esc(element, "id"),
                render_elements(element.content.as_deref().unwrap_or_default())
            )
        }
        "error_display" => format!(
            "<div class=\"error-display\"><h4>Runtime Error: {}</h4><pre>{}</pre></div>",
            esc(element, "message"),
            esc(element, "backtrace")
        ),
        other => {
            warn!(kind = other, "no static markup for element kind");
            String::new()
        }
    }
}

fn render_table(element: &Element) -> String {
    let head: String = strings(element, "headers")
        .iter()
        .map(|header| format!("<th>{}</th>", escape_html(header)))
        .collect();
    let rows: String = match element.attr("data") {
        Some(Value::Array(rows)) => rows
            .iter()
            .map(|row| {
                let cells: String = match row {
                    Value::Array(cells) => cells
                        .iter()
                        .map(|cell| {
                            let cell = match cell {
                                Value::String(value) => value.clone(),
                                other => other.to_string(),
                            };
                            format!("<td>{}</td>", escape_html(&cell))
                        })
                        .collect(),
                    _ => String::new(),
                };
                format!("<tr>{cells}</tr>")
            })
            .collect(),
        _ => String::new(),
    };
    format!(
        "<table class=\"table table-striped\"><thead><tr>{head}</tr></thead><tbody>{rows}</tbody></table>"
    )
}

fn render_navbar(navbar: Option<&NavbarConfig>, path: &str) -> String {
    let Some(navbar) = navbar else {
        return String::new();
    };
    let title = navbar.title.as_deref().map(escape_html).unwrap_or_default();
    let links: String = navbar
        .links
        .iter()
        .map(|link| {
            let active = if link.href == path {
                " navbar-link-active"
            } else {
                ""
            };
            format!(
                "<a class=\"btn btn-link{active}\" href=\"{}\">{}</a>",
                escape_html(&link.href),
                escape_html(&link.text)
            )
        })
        .collect();
    format!(
        "<section class=\"navbar-section\"><a href=\"#\" class=\"navbar-brand mr-2\">{title}</a></section><section class=\"navbar-section\">{links}</section>"
    )
}

/// Whole document for a GET of a registered page.
pub fn render_document(title: &str, path: &str, interactive: bool, tree: &PageTree) -> String {
    let boot = Boot {
        path,
        interactive,
        navbar: tree.navbar.as_ref(),
    };
    let navbar_class = if tree.navbar.is_some() {
        "navbar navbar-visible"
    } else {
        "navbar"
    };
    let layout_class = if tree.sidebar_elements.is_empty() {
        "layout"
    } else {
        "layout with-sidebar"
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
<link rel="stylesheet" href="https://unpkg.com/spectre.css/dist/spectre.min.css">
<link rel="stylesheet" href="https://unpkg.com/gridjs/dist/theme/mermaid.min.css">
<style>{STYLE}</style>
<script src="https://cdn.jsdelivr.net/npm/chart.js" defer></script>
<script src="https://unpkg.com/gridjs/dist/gridjs.umd.js" defer></script>
<script src="https://cdn.jsdelivr.net/npm/litepicker/dist/litepicker.js" defer></script>
<script src="https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js" defer></script>
</head>
<body>
<header id="navbar-container" class="{navbar_class}">{navbar}</header>
<div id="layout-container" class="{layout_class}">
<aside id="sidebar">{sidebar}</aside>
<main id="app">{main}</main>
</div>
<script>window.TRELLIS_BOOT = {boot};</script>
<script src="/assets/reconciler.js" defer></script>
</body>
</html>
"#,
        title = escape_html(title),
        navbar = render_navbar(tree.navbar.as_ref(), path),
        sidebar = render_elements(&tree.sidebar_elements),
        main = render_elements(&tree.elements),
        boot = script_json(&boot),
    )
}

const STYLE: &str = "body{margin:0}\
.navbar{display:none;padding:.5rem 1rem;border-bottom:1px solid #dadee4}\
.navbar.navbar-visible{display:flex}\
.navbar-link-active{font-weight:700}\
.layout{display:block}\
.layout.with-sidebar{display:grid;grid-template-columns:18rem 1fr}\
#sidebar{padding:1rem;border-right:1px solid #dadee4;overflow-y:auto}\
.layout:not(.with-sidebar) #sidebar{display:none}\
#app{padding:1rem 2rem;overflow-y:auto}\
.accordion-header{cursor:pointer;font-weight:600}\
.accordion:not(.open) .accordion-body{display:none}\
.error-display{padding:1rem;border:1px solid #e83e8c;background:rgba(232,62,140,.05)}\
.error-display h4{color:#e83e8c}\
.error-display pre{white-space:pre-wrap;font-size:.8em;color:#d1d1d1;background:#2b2b2b;padding:1rem;border-radius:4px}\
body.dark-mode{background:#1e1e1e;color:#e4e4e7}";

#[cfg(test)]
#[path = "tests/html_tests.rs"]
mod tests;
