use std::fs;
use std::path::Path;

use log::debug;
use pulldown_cmark::{Options, Parser, html};

use crate::errors::ServeError;
use crate::types::FrontMatter;

/// Read `<stem>.md`, split optional front matter from the body, and render
/// the body to an HTML fragment. Any read failure (missing, unreadable,
/// is-a-directory) surfaces as one undifferentiated not-found.
pub fn load_page(stem: &Path) -> Result<(String, FrontMatter), ServeError> {
    let mut filename = stem.as_os_str().to_owned();
    filename.push(".md");
    let raw = fs::read_to_string(Path::new(&filename)).map_err(|err| {
        debug!("Page read failed for {filename:?}: {err}");
        ServeError::NotFound(stem.display().to_string())
    })?;
    let (front, body) = split_front_matter(&raw);
    Ok((render_markdown(body), front))
}

/// Render Markdown to HTML with tables and task lists enabled
fn render_markdown(body: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(body, options));
    out
}

/// Split a leading `---`-delimited front matter block from the body.
/// Tolerant by contract: unknown keys and malformed lines are skipped,
/// quoted values are unquoted, and an unterminated block means the whole
/// input is body.
fn split_front_matter(raw: &str) -> (FrontMatter, &str) {
    let Some(rest) = raw
        .strip_prefix("---\n")
        .or_else(|| raw.strip_prefix("---\r\n"))
    else {
        return (FrontMatter::default(), raw);
    };

    let mut front = FrontMatter::default();
    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        let text = line.trim_end_matches(['\n', '\r']);
        if text.trim() == "---" {
            return (front, &rest[offset + line.len()..]);
        }
        if let Some((key, value)) = text.split_once(':') {
            let value = unquote(value.trim());
            if !value.is_empty() {
                match key.trim().to_ascii_lowercase().as_str() {
                    "title" => front.title = Some(value.to_string()),
                    "date" => front.date = Some(value.to_string()),
                    "time" => front.time = Some(value.to_string()),
                    "author" => front.author = Some(value.to_string()),
                    _ => {}
                }
            }
        }
        offset += line.len();
    }
    // No closing marker; treat the input as having no front matter at all
    (FrontMatter::default(), raw)
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2
        && ((value.starts_with('"') && value.ends_with('"'))
            || (value.starts_with('\'') && value.ends_with('\'')))
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}
