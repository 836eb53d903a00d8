use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

use log::debug;

use crate::types::{Link, PageInfo};
use crate::utils::{escape_attr, escape_html};
use crate::errors::ServeError;

/// A template file parsed into literal text and `{{field}}` placeholders
#[derive(Debug)]
pub struct Template {
    segments: Vec<Segment>,
}

#[derive(Debug)]
enum Segment {
    Literal(String),
    Field(String),
}

impl Template {
    /// Parse `{{field}}` placeholders out of raw template text
    pub fn parse(raw: &str) -> Result<Self, ServeError> {
        let mut segments = Vec::new();
        let mut rest = raw;
        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }
            let after = &rest[start + 2..];
            let Some(end) = after.find("}}") else {
                return Err(ServeError::TemplateParse(
                    "unterminated placeholder".to_string(),
                ));
            };
            segments.push(Segment::Field(after[..end].trim().to_string()));
            rest = &after[end + 2..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }
        Ok(Template { segments })
    }

    /// Substitute page info fields into the parsed template. Scalar fields
    /// are HTML-escaped; body, breadcrumb and dir are inserted as markup.
    pub fn execute(&self, info: &PageInfo) -> Result<String, ServeError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => match name.as_str() {
                    "title" => out.push_str(&escape_html(&info.title)),
                    "date" => out.push_str(&escape_html(&info.date)),
                    "time" => out.push_str(&escape_html(&info.time)),
                    "author" => out.push_str(&escape_html(&info.author)),
                    "body" => out.push_str(&info.body),
                    "breadcrumb" => out.push_str(&breadcrumb_html(&info.breadcrumb)),
                    "dir" => out.push_str(&listing_html(&info.dir)),
                    other => {
                        return Err(ServeError::TemplateExec(format!("unknown field {other:?}")));
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Render breadcrumb links in document order
fn breadcrumb_html(crumbs: &[Link]) -> String {
    let mut html = String::from("<nav class=\"breadcrumb\">");
    for (i, link) in crumbs.iter().enumerate() {
        if i > 0 {
            html.push_str(" / ");
        }
        html.push_str(&format!(
            "<a href=\"{}\">{}</a>",
            escape_attr(&link.path),
            escape_html(&link.title)
        ));
    }
    html.push_str("</nav>");
    html
}

/// Render a directory listing as an unordered list
fn listing_html(links: &[Link]) -> String {
    let mut html = String::from("<ul class=\"listing\">\n");
    for link in links {
        html.push_str(&format!(
            "  <li><a href=\"{}\">{}</a></li>\n",
            escape_attr(&link.path),
            escape_html(&link.title)
        ));
    }
    html.push_str("</ul>");
    html
}

/// A parsed template plus the moment it was parsed
struct TemplateEntry {
    template: Arc<Template>,
    parsed_at: Instant,
}

/// Cache of parsed templates keyed by (site root, stage name).
///
/// An entry older than `max_age` is a miss: it is replaced, never read.
/// `max_age` of None disables expiry. Lookup-or-populate holds the lock
/// for its whole duration, so concurrent requests can at worst duplicate
/// a reparse but never observe a partially parsed template.
pub struct TemplateCache {
    entries: Mutex<HashMap<(PathBuf, String), TemplateEntry>>,
    max_age: Option<Duration>,
    parses: AtomicUsize,
}

impl TemplateCache {
    pub fn new(max_age: Option<Duration>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            max_age,
            parses: AtomicUsize::new(0),
        }
    }

    /// Render one template stage for a site against the given page info
    pub fn render(&self, site: &Path, stage: &str, info: &PageInfo) -> Result<String, ServeError> {
        self.lookup(site, stage)?.execute(info)
    }

    fn lookup(&self, site: &Path, stage: &str) -> Result<Arc<Template>, ServeError> {
        let key = (site.to_path_buf(), stage.to_string());
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(entry) = entries.get(&key) {
            let fresh = self
                .max_age
                .is_none_or(|age| entry.parsed_at.elapsed() < age);
            if fresh {
                return Ok(Arc::clone(&entry.template));
            }
        }

        let path = site.join("templates").join(format!("{stage}.html"));
        debug!("Parsing template {path:?}");
        let raw = fs::read_to_string(&path)
            .map_err(|err| ServeError::TemplateParse(format!("{}: {err}", path.display())))?;
        let template = Arc::new(Template::parse(&raw)?);
        self.parses.fetch_add(1, Ordering::Relaxed);
        entries.insert(
            key,
            TemplateEntry {
                template: Arc::clone(&template),
                parsed_at: Instant::now(),
            },
        );
        Ok(template)
    }

    /// Number of template parses performed so far
    pub fn parse_count(&self) -> usize {
        self.parses.load(Ordering::Relaxed)
    }
}
