use std::path::PathBuf;
use std::sync::Arc;

use time::OffsetDateTime;
use time::macros::format_description;

use crate::templates::TemplateCache;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub sites_dir: Arc<PathBuf>,
    pub templates: Arc<TemplateCache>,
}

/// A navigable reference, used for breadcrumbs and directory listings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub title: String,
    pub path: String,
}

/// Metadata parsed from the front of a Markdown file.
/// Unset keys leave the matching `PageInfo` field at its default.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub author: Option<String>,
}

/// The view-model handed to every template stage for one request
#[derive(Debug, Clone, Default)]
pub struct PageInfo {
    pub breadcrumb: Vec<Link>,
    pub title: String,
    pub date: String,
    pub time: String,
    pub author: String,
    pub dir: Vec<Link>,
    pub body: String,
}

impl PageInfo {
    /// Build a page info from front matter, filling absent date and time
    /// fields with the current moment
    pub fn from_front_matter(front: FrontMatter) -> Self {
        let now = OffsetDateTime::now_utc();
        let date = front.date.unwrap_or_else(|| {
            now.format(format_description!("[year]-[month]-[day]"))
                .unwrap_or_default()
        });
        let time = front.time.unwrap_or_else(|| {
            now.format(format_description!("[hour]:[minute]:[second]"))
                .unwrap_or_default()
        });
        Self {
            title: front.title.unwrap_or_default(),
            date,
            time,
            author: front.author.unwrap_or_default(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_matter_fields_carry_over() {
        let front = FrontMatter {
            title: Some("About".to_string()),
            date: Some("2024-01-01".to_string()),
            time: Some("12:00:00".to_string()),
            author: Some("alice".to_string()),
        };
        let info = PageInfo::from_front_matter(front);
        assert_eq!(info.title, "About");
        assert_eq!(info.date, "2024-01-01");
        assert_eq!(info.time, "12:00:00");
        assert_eq!(info.author, "alice");
    }

    #[test]
    fn absent_metadata_defaults_to_now_and_empty() {
        let info = PageInfo::from_front_matter(FrontMatter::default());
        assert!(info.title.is_empty());
        assert!(info.author.is_empty());
        // YYYY-MM-DD and HH:MM:SS
        assert_eq!(info.date.len(), 10);
        assert_eq!(info.time.len(), 8);
    }
}
