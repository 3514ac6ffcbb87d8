//! HTML building blocks: escaping, the page shell, tables and forms.

use std::fmt::Write as _;

use crate::db::{ReportRow, ReportValue};
use crate::flash::Flash;
use crate::pages::{consumers, search, vendors, warehouse, Section, HOME_PATH};

const STYLE: &str = "\
body{font-family:system-ui,sans-serif;margin:0;background:#f6f7f9;color:#222}\
nav{background:#24323f;padding:.8em 1.5em}nav a{color:#fff;margin-right:1.2em;text-decoration:none}\
main{padding:1.5em}table{border-collapse:collapse;background:#fff;margin-bottom:1.5em}\
th,td{border:1px solid #ccd;padding:.3em .6em;text-align:left}th{background:#e8ebf0}\
.flash{padding:.6em 1em;margin-bottom:.6em;border-radius:4px}\
.flash.success{background:#dff3e3}.flash.warning{background:#fff4d6}.flash.error{background:#fbe0e0}\
.empty{color:#777}.setup-required{background:#fff4d6;padding:.6em 1em}\
form{background:#fff;padding:1em;margin-bottom:1em;border:1px solid #ccd}";

/// Escape text for element content and double-quoted attributes
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
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

/// Cell text for a value; NULL renders as an empty cell
pub fn cell(value: &ReportValue) -> String {
    match value {
        ReportValue::Null => String::new(),
        other => escape(&other.to_string()),
    }
}

/// Full document around a page body
pub fn layout(title: &str, flashes: &[Flash], body: &str) -> String {
    let mut flash_html = String::new();
    for flash in flashes {
        let _ = write!(
            flash_html,
            "<div class=\"flash {}\">{}</div>",
            flash.level.as_str(),
            escape(&flash.text)
        );
    }

    format!(
        "<!doctype html><html><head><meta charset=\"utf-8\"><title>{title} - AdventureWorks Dashboard</title>\
<style>{STYLE}</style></head><body>\
<nav><a href=\"{home}\">Home</a><a href=\"{vendors}\">Vendors</a><a href=\"{warehouse}\">Warehouse</a>\
<a href=\"{consumers}\">Consumers</a><a href=\"{search}\">Search</a></nav>\
<main><h1>{title}</h1>{flash_html}{body}</main></body></html>",
        title = escape(title),
        home = HOME_PATH,
        vendors = vendors::PATH,
        warehouse = warehouse::PATH,
        consumers = consumers::PATH,
        search = search::PATH,
    )
}

/// Rows as a table; headers come from the first row's columns
pub fn table(rows: &[ReportRow]) -> String {
    let Some(first) = rows.first() else {
        return "<p class=\"empty\">No data available.</p>".to_string();
    };

    let mut html = String::from("<table><thead><tr>");
    for name in first.column_names() {
        let _ = write!(html, "<th>{}</th>", escape(name));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for value in row.values() {
            let _ = write!(html, "<td>{}</td>", cell(value));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

/// A titled report section, or its setup notice when the backing object is missing
pub fn section(heading: &str, section: &Section) -> String {
    let content = match section {
        Section::Rows(rows) => table(rows),
        Section::Absent(object) => format!(
            "<p class=\"setup-required\">Setup required: the {} <code>{}</code> does not exist yet. \
Create it with the provided SQL to enable this report.</p>",
            object.kind(),
            escape(object.name())
        ),
    };
    format!("<section><h2>{}</h2>{}</section>", escape(heading), content)
}

/// Input field of a POST form
pub struct Field<'a> {
    pub name: &'a str,
    pub label: &'a str,
    pub input_type: &'a str,
}

/// POST form identified by its hidden `form_name`
pub fn form(action: &str, form_name: &str, title: &str, fields: &[Field<'_>], submit: &str) -> String {
    let mut html = format!(
        "<form method=\"post\" action=\"{}\"><h3>{}</h3>\
<input type=\"hidden\" name=\"form_name\" value=\"{}\">",
        escape(action),
        escape(title),
        escape(form_name)
    );
    for field in fields {
        let _ = write!(
            html,
            "<label>{} <input type=\"{}\" name=\"{}\"></label> ",
            escape(field.label),
            escape(field.input_type),
            escape(field.name)
        );
    }
    let _ = write!(html, "<button type=\"submit\">{}</button></form>", escape(submit));
    html
}
