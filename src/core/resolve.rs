//! Link path resolution shared by the vault implementations

use super::entry::{join_path, normalize_path, parent_path, strip_document_extension, DOCUMENT_EXTENSION};

/// Resolve `./` and `../` segments of `link` against `folder`.
/// Returns `None` when the link climbs above the vault root.
fn resolve_against(folder: &str, link: &str) -> Option<String> {
    let mut segments: Vec<&str> = folder.split('/').filter(|s| !s.is_empty()).collect();
    for part in link.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                segments.pop()?;
            }
            _ => segments.push(part),
        }
    }
    Some(segments.join("/"))
}

/// Path from `from_folder` to `to_path`, using `..` where needed
pub fn relative_path(from_folder: &str, to_path: &str) -> String {
    let from = normalize_path(from_folder);
    let to = normalize_path(to_path);
    let from_parts: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_parts: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_parts
        .iter()
        .zip(to_parts.iter())
        .take_while(|(a, b)| a == b)
        .count();

    let mut parts: Vec<&str> = vec![".."; from_parts.len() - common];
    parts.extend(&to_parts[common..]);
    parts.join("/")
}

/// Find the document a link points to.
///
/// `documents` lists every document path in the vault. Lookup order: exact
/// vault path, path relative to the source's folder, then any document whose
/// path ends with the link (nearest to the source, then shortest).
pub fn resolve_linkpath<'a, I>(linkpath: &str, source_path: &str, documents: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let link = linkpath.split('#').next().unwrap_or_default().trim();
    if link.is_empty() {
        return None;
    }

    let documents: Vec<&str> = documents.into_iter().collect();
    let with_extension = |path: &str| -> Vec<String> {
        vec![path.to_string(), format!("{}.{}", path, DOCUMENT_EXTENSION)]
    };
    let find = |candidate: &str| documents.iter().find(|doc| **doc == candidate).map(|doc| doc.to_string());

    for candidate in with_extension(&normalize_path(link)) {
        if let Some(found) = find(&candidate) {
            return Some(found);
        }
    }

    let source_folder = parent_path(source_path);
    if let Some(relative) = resolve_against(&source_folder, link) {
        for candidate in with_extension(&relative) {
            if let Some(found) = find(&candidate) {
                return Some(found);
            }
        }
    }

    // Link paths containing `..` only resolve relatively
    let suffix = normalize_path(strip_document_extension(link));
    if suffix.is_empty() || suffix.split('/').any(|s| s == "..") {
        return None;
    }

    let mut matches: Vec<&str> = documents
        .iter()
        .copied()
        .filter(|doc| {
            let stem = strip_document_extension(doc);
            stem == suffix || stem.ends_with(&format!("/{}", suffix))
        })
        .collect();

    matches.sort_by(|a, b| {
        let a_near = parent_path(a) == source_folder;
        let b_near = parent_path(b) == source_folder;
        b_near
            .cmp(&a_near)
            .then_with(|| a.len().cmp(&b.len()))
            .then_with(|| a.cmp(b))
    });

    matches.first().map(|doc| join_path("", doc))
}
