use std::fs;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    extract::{Host, Path as AxumPath, State},
    response::{Html, IntoResponse, Response},
};
use log::{debug, error, info, warn};

use crate::errors::ServeError;
use crate::listing::list_dir;
use crate::nav::breadcrumb;
use crate::page::load_page;
use crate::resolve::{Resolution, resolve};
use crate::types::{AppState, FrontMatter, PageInfo};
use crate::utils::host_name;

/// Handle requests for the site root
pub async fn handle_root(State(state): State<AppState>, Host(host): Host) -> Response {
    dispatch(&state, &host, "").await
}

/// Handle all other request paths
pub async fn handle_path(
    State(state): State<AppState>,
    Host(host): Host,
    AxumPath(path): AxumPath<String>,
) -> Response {
    dispatch(&state, &host, &path).await
}

/// Classify and serve one request. Content-resolution failures map to 404,
/// template and domain-config failures to 500; requests are independent
/// and stateless.
pub async fn dispatch(state: &AppState, host: &str, req_path: &str) -> Response {
    let host = host_name(host);
    info!("{host} GET /{req_path}");

    let site = match check_domain(&state.sites_dir, host) {
        Ok(site) => site,
        Err(err) => return err.into_response(),
    };

    serve(state, &site, req_path).unwrap_or_else(|err| {
        match &err {
            ServeError::TemplateParse(msg) | ServeError::TemplateExec(msg) => {
                error!("Template failure for /{req_path}: {msg}");
            }
            ServeError::NotFound(path) => info!("Not found: {path}"),
            ServeError::Containment => warn!("Rejected path escaping content root: /{req_path}"),
            ServeError::Io(cause) => warn!("Read failure under /{req_path}: {cause}"),
            ServeError::DomainConfig(_) => {}
        }
        err.into_response()
    })
}

/// Guard clause for a servable host: its site root needs both a content
/// tree and a template set
fn check_domain(sites_dir: &Path, host: &str) -> Result<PathBuf, ServeError> {
    if host.is_empty() || host.contains(['/', '\\']) || host.contains("..") {
        warn!("Rejected host {host:?}");
        return Err(ServeError::DomainConfig(host.to_string()));
    }
    let site = sites_dir.join(host);
    if !site.join("pub").is_dir() || !site.join("templates").is_dir() {
        warn!("Host {host} has no pub/ and templates/ under {sites_dir:?}");
        return Err(ServeError::DomainConfig(host.to_string()));
    }
    Ok(site)
}

fn serve(state: &AppState, site: &Path, req_path: &str) -> Result<Response, ServeError> {
    let pub_root = site.join("pub");
    let url_path = format!("/{req_path}");

    match resolve(&pub_root, req_path)? {
        Resolution::Page { stem } => {
            let (body, front) =
                load_page(&stem).map_err(|_| ServeError::NotFound(url_path.clone()))?;
            let mut info = PageInfo::from_front_matter(front);
            info.breadcrumb = breadcrumb(&url_path);
            info.body = body;
            let html = render_stages(state, site, &info, &["header", "view", "footer"])?;
            Ok(Html(html).into_response())
        }
        Resolution::RawFile { file } => {
            let bytes = fs::read(&file)?;
            debug!("Serving raw file {file:?} ({} bytes)", bytes.len());
            Ok(Response::new(Body::from(bytes)))
        }
        Resolution::Directory { dir, html_index } => {
            if let Some(index) = html_index {
                debug!("Serving verbatim {index:?}");
                return Ok(Html(fs::read(&index)?).into_response());
            }

            let links =
                list_dir(&dir, &url_path).map_err(|_| ServeError::NotFound(url_path.clone()))?;

            // A _index.md summary is optional; load failures just mean a
            // bare listing
            let summary = load_page(&dir.join("_index")).ok();
            let stages: &[&str] = if summary.is_some() {
                &["header", "view", "dir", "footer"]
            } else {
                &["header", "dir", "footer"]
            };
            let mut info = match summary {
                Some((body, front)) => {
                    let mut info = PageInfo::from_front_matter(front);
                    info.body = body;
                    info
                }
                None => PageInfo::from_front_matter(FrontMatter::default()),
            };
            info.breadcrumb = breadcrumb(&url_path);
            info.dir = links;
            let html = render_stages(state, site, &info, stages)?;
            Ok(Html(html).into_response())
        }
        Resolution::NotFound => Err(ServeError::NotFound(url_path)),
    }
}

/// Render template stages in sequence, aborting on the first failure
fn render_stages(
    state: &AppState,
    site: &Path,
    info: &PageInfo,
    stages: &[&str],
) -> Result<String, ServeError> {
    let mut out = String::new();
    for stage in stages {
        out.push_str(&state.templates.render(site, stage, info)?);
    }
    Ok(out)
}
