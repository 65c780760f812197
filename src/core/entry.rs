//! Vault entries: documents and folders addressed by vault path
//!
//! Paths are `/`-separated and relative to the vault root. The root folder
//! itself is the empty path. Entries are plain values; stores hand out fresh
//! ones on every lookup.

/// Extension of documents created by the lifecycle manager
pub const DOCUMENT_EXTENSION: &str = "md";

/// Normalize a vault path: trim surrounding slashes, drop empty and `.`
/// segments and convert backslashes.
pub fn normalize_path(path: &str) -> String {
    path.replace('\\', "/")
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// Whether a path climbs above the vault root through a `..` segment
pub fn escapes_root(path: &str) -> bool {
    normalize_path(path).split('/').any(|segment| segment == "..")
}

/// Join a child name onto a folder path
pub fn join_path(folder: &str, name: &str) -> String {
    let folder = normalize_path(folder);
    if folder.is_empty() {
        normalize_path(name)
    } else {
        normalize_path(&format!("{}/{}", folder, name))
    }
}

/// Parent folder of a path (`""` for top-level entries and the root)
pub fn parent_path(path: &str) -> String {
    let path = normalize_path(path);
    match path.rfind('/') {
        Some(idx) => path[..idx].to_string(),
        None => String::new(),
    }
}

/// Last segment of a path
pub fn file_name(path: &str) -> String {
    let path = normalize_path(path);
    match path.rfind('/') {
        Some(idx) => path[idx + 1..].to_string(),
        None => path,
    }
}

/// Strip the extension from a file name, keeping dot-files intact
fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Path without its document extension, e.g. `a/b.md` -> `a/b`
pub fn strip_document_extension(path: &str) -> &str {
    let suffix = format!(".{}", DOCUMENT_EXTENSION);
    path.strip_suffix(suffix.as_str()).unwrap_or(path)
}

/// A document (file) in the vault
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentRef {
    path: String,
}

impl DocumentRef {
    /// Create a reference from a vault path
    pub fn new(path: impl AsRef<str>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
        }
    }

    /// Full vault path, e.g. `Projects/Plan.md`
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name including extension
    pub fn name(&self) -> String {
        file_name(&self.path)
    }

    /// Human-readable name: file name without extension
    pub fn base_name(&self) -> String {
        strip_extension(&self.name()).to_string()
    }

    /// Path of the containing folder
    pub fn parent_path(&self) -> String {
        parent_path(&self.path)
    }
}

impl std::fmt::Display for DocumentRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

/// Kind of a vault entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Document,
    Folder,
}

/// A direct child of a folder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildEntry {
    pub name: String,
    pub kind: EntryKind,
}

impl ChildEntry {
    pub fn new(name: impl Into<String>, kind: EntryKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Hidden or system artifact (`.DS_Store`, `~lock` files, ...)
    pub fn is_system_artifact(&self) -> bool {
        self.name.starts_with('.') || self.name.starts_with('~')
    }
}

/// A folder snapshot with its direct children
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FolderRef {
    path: String,
    pub children: Vec<ChildEntry>,
}

impl FolderRef {
    pub fn new(path: impl AsRef<str>, children: Vec<ChildEntry>) -> Self {
        Self {
            path: normalize_path(path.as_ref()),
            children,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> String {
        file_name(&self.path)
    }

    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Parent folder path, `None` for the root
    pub fn parent_path(&self) -> Option<String> {
        if self.is_root() {
            None
        } else {
            Some(parent_path(&self.path))
        }
    }

    /// Empty, or holding nothing but system artifacts
    pub fn is_effectively_empty(&self) -> bool {
        self.children.iter().all(ChildEntry::is_system_artifact)
    }
}

/// Result of resolving a path against a store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Document(DocumentRef),
    Folder(FolderRef),
}

impl Entry {
    pub fn path(&self) -> &str {
        match self {
            Entry::Document(doc) => doc.path(),
            Entry::Folder(folder) => folder.path(),
        }
    }
}
