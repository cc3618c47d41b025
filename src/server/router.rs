//! Request routing for the control server.
//!
//! | Method | Path          | Route        |
//! |--------|---------------|--------------|
//! | GET    | `/`           | trigger page |
//! | POST   | `/hot-reload` | reload       |
//! | other  | other         | not found    |

use serde::Deserialize;
use tiny_http::Method;

use crate::log;
use crate::registry::ModRegistry;
use crate::reload::ReloadRequest;

/// Path that accepts reload triggers.
pub const RELOAD_PATH: &str = "/hot-reload";

/// Where a request goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    TriggerPage,
    HotReload,
    NotFound,
}

/// Which mods a POST body asked for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadSelection {
    All,
    Named(Vec<String>),
}

#[derive(Debug, Deserialize)]
struct ReloadBody {
    mods: Vec<String>,
}

/// Route by method and path. The query string is ignored.
pub fn route(method: &Method, url: &str) -> Route {
    let path = url.split_once('?').map_or(url, |(path, _)| path);

    match method {
        Method::Get if path == "/" => Route::TriggerPage,
        Method::Post if path.eq_ignore_ascii_case(RELOAD_PATH) => Route::HotReload,
        _ => Route::NotFound,
    }
}

/// Parse an optional `{"mods": [...]}` body.
///
/// An empty (or whitespace-only) body selects every managed mod.
pub fn parse_selection(body: &[u8]) -> Result<ReloadSelection, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ReloadSelection::All);
    }

    let body: ReloadBody = serde_json::from_slice(body)?;
    Ok(ReloadSelection::Named(body.mods))
}

/// Turn a selection into a request against the managed set.
///
/// Unknown names are warned about and dropped. Returns `None` when names
/// were given but none matched, since an empty request means "all".
pub fn resolve(selection: ReloadSelection, registry: &ModRegistry) -> Option<ReloadRequest> {
    let names = match selection {
        ReloadSelection::All => return Some(ReloadRequest::all()),
        ReloadSelection::Named(names) => names,
    };

    let mut matched = Vec::with_capacity(names.len());
    for name in &names {
        match registry.find(name) {
            Some(entry) => matched.push(entry.clone()),
            None => log!("warn"; "mod not found or not enabled for hot reload: {}", name),
        }
    }

    if matched.is_empty() {
        log!("warn"; "no managed mod matched the request, nothing to reload");
        return None;
    }

    Some(ReloadRequest::mods(matched))
}
