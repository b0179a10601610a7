// Drive share links point at a viewer page, which an <img> tag cannot load.
// These helpers rewrite them into the direct-view form.

pub const DRIVE_HOST: &str = "drive.google.com";

/// Canonical direct-view URL for a Drive file id.
pub fn direct_view_url(file_id: &str) -> String {
    format!("https://{DRIVE_HOST}/uc?export=view&id={file_id}")
}

/// Rewrites a Drive link into its direct-view form.
///
/// Total: anything that is not a Drive link, or a Drive link with no
/// recognisable file id, comes back unchanged.
pub fn normalize(url: &str) -> String {
    let trimmed = url.trim();
    if !trimmed.contains(DRIVE_HOST) {
        return url.to_string();
    }

    match extract_file_id(trimmed) {
        Some(id) => direct_view_url(id),
        None => {
            tracing::debug!(url = trimmed, "Drive link without a file id left unchanged");
            url.to_string()
        }
    }
}

/// Pulls the file id out of a Drive link.
///
/// An `id=` query parameter wins. Otherwise the share-link convention
/// `.../file/d/<id>/view` is used: the segment after `d`, falling back to the
/// segment before the last one.
pub fn extract_file_id(url: &str) -> Option<&str> {
    if let Some(id) = query_id(url) {
        return Some(id);
    }

    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path
        .split_once("://")
        .map_or(path, |(_, rest)| rest)
        .trim_end_matches('/');
    // First segment is the host.
    let segments: Vec<&str> = path.split('/').skip(1).collect();

    if let Some(pos) = segments.iter().position(|s| *s == "d") {
        if let Some(id) = segments.get(pos + 1).filter(|id| is_file_id(id)) {
            return Some(*id);
        }
    }

    match segments.as_slice() {
        [.., id, _last] if is_file_id(id) && *id != "d" => Some(*id),
        _ => None,
    }
}

fn query_id(url: &str) -> Option<&str> {
    let (_, query) = url.split_once('?')?;
    let query = query.split('#').next().unwrap_or(query);
    query
        .split('&')
        .find_map(|pair| pair.strip_prefix("id="))
        .filter(|id| is_file_id(id))
}

fn is_file_id(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
