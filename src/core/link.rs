//! Link markup: building links to new notes and finding links in a line
//!
//! Offsets are character offsets within a single line, matching editor
//! cursor columns.

use std::sync::LazyLock;

use regex_lite::Regex;

use super::config::{LinkDisplayMode, LinkType, Settings};
use super::entry::{strip_document_extension, DocumentRef};
use super::resolve::relative_path;
use crate::plugin::api::LinkResolver;

/// `[[target]]` or `[[target|alias]]`
static WIKI_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[([^\]|]+)(?:\|([^\]]*))?\]\]").expect("valid wiki link pattern"));

/// `[text](target)`
static MARKDOWN_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]+)\)").expect("valid markdown link pattern"));

/// Build the link inserted in place of the selection
pub fn format_link(target: &DocumentRef, source: &DocumentRef, settings: &Settings) -> String {
    let display = target.base_name();
    let path = match settings.link_display_mode {
        LinkDisplayMode::Short => display.clone(),
        LinkDisplayMode::Relative => relative_path(
            &source.parent_path(),
            strip_document_extension(target.path()),
        ),
        LinkDisplayMode::Absolute => target.path().to_string(),
    };

    match (settings.link_type, settings.link_display_mode) {
        (LinkType::Wiki, LinkDisplayMode::Short) => format!("[[{}]]", path),
        (LinkType::Wiki, LinkDisplayMode::Relative | LinkDisplayMode::Absolute) => {
            format!("[[{}|{}]]", path, display)
        }
        (LinkType::Markdown, _) => format!("[{}]({})", display, path),
    }
}

/// Markup flavour of a span found in text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Wiki,
    Markdown,
}

/// A link found in a line of text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSpan {
    /// First character of the markup
    pub start: usize,
    /// One past the last character
    pub end: usize,
    pub kind: LinkKind,
    /// Link target as written
    pub reference: String,
    /// Text shown to the reader
    pub display_text: String,
    pub raw: String,
    /// Document the reference resolves to
    pub target: DocumentRef,
}

/// A link parsed from markup, not yet resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedLink {
    pub kind: LinkKind,
    pub reference: String,
    pub display_text: String,
}

/// Parse a single piece of link markup (the whole string must be one link)
pub fn parse_link(markup: &str) -> Option<ParsedLink> {
    if let Some(caps) = WIKI_LINK.captures(markup) {
        if caps.get(0).map(|m| m.as_str()) == Some(markup) {
            let reference = caps[1].to_string();
            let display_text = caps
                .get(2)
                .map(|m| m.as_str().to_string())
                .unwrap_or_else(|| reference.clone());
            return Some(ParsedLink {
                kind: LinkKind::Wiki,
                reference,
                display_text,
            });
        }
    }

    let caps = MARKDOWN_LINK.captures(markup)?;
    if caps.get(0).map(|m| m.as_str()) != Some(markup) {
        return None;
    }
    Some(ParsedLink {
        kind: LinkKind::Markdown,
        reference: caps[2].to_string(),
        display_text: caps[1].to_string(),
    })
}

fn char_offset(text: &str, byte_offset: usize) -> usize {
    text[..byte_offset].chars().count()
}

/// Convert a character offset to a byte offset, clamped to the text length
pub fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len())
}

/// Find the link under `cursor` (character offset, both span ends inclusive).
///
/// Wiki links are scanned before markdown links; the first span that covers
/// the cursor and resolves to an existing document wins.
pub fn find_link_at(
    line: &str,
    cursor: usize,
    source: &DocumentRef,
    resolver: &dyn LinkResolver,
) -> Option<LinkSpan> {
    let wiki = WIKI_LINK.captures_iter(line).map(|caps| (LinkKind::Wiki, caps));
    let markdown = MARKDOWN_LINK
        .captures_iter(line)
        .map(|caps| (LinkKind::Markdown, caps));

    for (kind, caps) in wiki.chain(markdown) {
        let whole = caps.get(0)?;
        let start = char_offset(line, whole.start());
        let end = char_offset(line, whole.end());
        if cursor < start || cursor > end {
            continue;
        }

        let (reference, display_text) = match kind {
            LinkKind::Wiki => {
                let reference = caps[1].to_string();
                let display = caps
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_else(|| reference.clone());
                (reference, display)
            }
            LinkKind::Markdown => (caps[2].to_string(), caps[1].to_string()),
        };

        match resolver.resolve_link(&reference, source.path()) {
            Some(target) => {
                return Some(LinkSpan {
                    start,
                    end,
                    kind,
                    reference,
                    display_text,
                    raw: whole.as_str().to_string(),
                    target,
                })
            }
            None => tracing::debug!("Skipping unresolved link: {}", whole.as_str()),
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::memory_vault::MemoryVault;

    fn settings(link_type: LinkType, mode: LinkDisplayMode) -> Settings {
        Settings {
            link_type,
            link_display_mode: mode,
            ..Settings::default()
        }
    }

    #[test]
    fn test_format_link_variants() {
        let source = DocumentRef::new("Projects/Plan.md");
        let target = DocumentRef::new("Projects/Plan/Milestone 1.md");

        let cases = [
            (LinkType::Wiki, LinkDisplayMode::Short, "[[Milestone 1]]"),
            (LinkType::Wiki, LinkDisplayMode::Relative, "[[Plan/Milestone 1|Milestone 1]]"),
            (
                LinkType::Wiki,
                LinkDisplayMode::Absolute,
                "[[Projects/Plan/Milestone 1.md|Milestone 1]]",
            ),
            (LinkType::Markdown, LinkDisplayMode::Short, "[Milestone 1](Milestone 1)"),
            (LinkType::Markdown, LinkDisplayMode::Relative, "[Milestone 1](Plan/Milestone 1)"),
            (
                LinkType::Markdown,
                LinkDisplayMode::Absolute,
                "[Milestone 1](Projects/Plan/Milestone 1.md)",
            ),
        ];

        for (link_type, mode, expected) in cases {
            assert_eq!(format_link(&target, &source, &settings(link_type, mode)), expected);
        }
    }

    #[test]
    fn test_relative_link_climbs_out_of_source_folder() {
        let source = DocumentRef::new("Projects/Plan.md");
        let target = DocumentRef::new("Inbox/Idea.md");
        let link = format_link(&target, &source, &settings(LinkType::Wiki, LinkDisplayMode::Relative));
        assert_eq!(link, "[[../Inbox/Idea|Idea]]");
    }

    #[test]
    fn test_parse_link() {
        let wiki = parse_link("[[Plan/Milestone 1|Milestone 1]]").unwrap();
        assert_eq!(wiki.kind, LinkKind::Wiki);
        assert_eq!(wiki.reference, "Plan/Milestone 1");
        assert_eq!(wiki.display_text, "Milestone 1");

        assert_eq!(parse_link("[[Bare]]").unwrap().display_text, "Bare");

        let md = parse_link("[Shown](Some/Path.md)").unwrap();
        assert_eq!(md.kind, LinkKind::Markdown);
        assert_eq!(md.display_text, "Shown");

        assert!(parse_link("text [[Bare]]").is_none());
    }

    #[test]
    fn test_find_link_boundaries_and_order() {
        let vault = MemoryVault::new();
        vault.insert_document("Notes/A.md", "");
        vault.insert_document("Notes/B.md", "");
        let source = DocumentRef::new("Notes/Index.md");

        let line = "see [[A]] and [B](B)";
        // "see " is 4 chars, "[[A]]" spans 4..9
        assert_eq!(find_link_at(line, 4, &source, &vault).unwrap().target.path(), "Notes/A.md");
        assert_eq!(find_link_at(line, 9, &source, &vault).unwrap().start, 4);
        assert!(find_link_at(line, 11, &source, &vault).is_none());

        let md = find_link_at(line, 20, &source, &vault).unwrap();
        assert_eq!(md.kind, LinkKind::Markdown);
        assert_eq!((md.start, md.end), (14, 20));
        assert_eq!(md.display_text, "B");
    }

    #[test]
    fn test_find_link_skips_unresolved_and_uses_char_offsets() {
        let vault = MemoryVault::new();
        vault.insert_document("Café.md", "");
        let source = DocumentRef::new("Index.md");

        assert!(find_link_at("[[Nowhere]]", 3, &source, &vault).is_none());

        let line = "ééé [[Café]]";
        let span = find_link_at(line, 4, &source, &vault).unwrap();
        assert_eq!((span.start, span.end), (4, 12));
        assert_eq!(span.raw, "[[Café]]");
    }

    #[test]
    fn test_byte_offset() {
        assert_eq!(byte_offset("ééx", 2), 4);
        assert_eq!(byte_offset("abc", 10), 3);
    }

    #[test]
    fn test_formatted_links_resolve_back_to_target() {
        let vault = MemoryVault::new();
        vault.insert_document("Projects/Plan.md", "");
        vault.insert_document("Projects/Plan/Milestone 1.md", "");
        let source = DocumentRef::new("Projects/Plan.md");
        let target = DocumentRef::new("Projects/Plan/Milestone 1.md");

        for link_type in [LinkType::Wiki, LinkType::Markdown] {
            for mode in [LinkDisplayMode::Short, LinkDisplayMode::Relative, LinkDisplayMode::Absolute] {
                let line = format!("before {} after", format_link(&target, &source, &settings(link_type, mode)));
                let span = find_link_at(&line, 8, &source, &vault)
                    .unwrap_or_else(|| panic!("no link found in {:?}", line));
                assert_eq!(span.target, target);
            }
        }
    }
}
