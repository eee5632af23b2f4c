//! Resolved templates and virtual template paths.

use std::fmt;

use crate::constants::PARTIAL_PREFIX;

/// A template resolved by a [`Resolver`](super::Resolver).
///
/// The `identifier` is the template's unique identity (its file path for
/// filesystem templates). Two different names that resolve to the same
/// identifier are the same template as far as the tree builder is concerned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    /// Unique identity of the template
    pub identifier: String,
    /// Virtual path, e.g. `articles/_comment`
    pub virtual_path: String,
    /// Raw template source
    pub source: String,
    /// Handler extension, e.g. `erb`
    pub handler: String,
    /// Format extension, e.g. `html`, if the filename carries one
    pub format: Option<String>,
}

/// A parsed virtual template path.
///
/// `articles/_comment` parses to prefix `articles`, name `comment`, partial.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TemplatePath {
    /// Directory part of the path (may be empty)
    pub prefix: String,
    /// Basename without the partial prefix
    pub name: String,
    /// Whether the basename carries the partial prefix
    pub partial: bool,
}

impl TemplatePath {
    /// Parse a virtual path such as `articles/_comment`.
    pub fn parse(virtual_path: &str) -> Self {
        let (prefix, base) = match virtual_path.rsplit_once('/') {
            Some((prefix, base)) => (prefix, base),
            None => ("", virtual_path),
        };
        let (name, partial) = match base.strip_prefix(PARTIAL_PREFIX) {
            Some(name) => (name, true),
            None => (base, false),
        };
        Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            partial,
        }
    }

    /// Build the path for a lookup of `name` under `prefix`.
    ///
    /// Any directory component of `name` is appended to the prefix, so
    /// `build("comments/comment", "", true)` is `comments/_comment`.
    pub fn build(name: &str, prefix: &str, partial: bool) -> Self {
        let (dir, base) = match name.rsplit_once('/') {
            Some((dir, base)) => (dir, base),
            None => ("", name),
        };
        let prefix = match (prefix.is_empty(), dir.is_empty()) {
            (true, _) => dir.to_string(),
            (false, true) => prefix.to_string(),
            (false, false) => format!("{prefix}/{dir}"),
        };
        Self {
            prefix,
            name: base.to_string(),
            partial,
        }
    }

    /// Whether every segment stays inside the view directory.
    ///
    /// Rejects `.`/`..` segments, absolute prefixes, and backslashes.
    pub fn is_confined(&self) -> bool {
        if self.prefix.starts_with('/') {
            return false;
        }
        self.prefix
            .split('/')
            .chain(std::iter::once(self.name.as_str()))
            .all(|segment| segment != "." && segment != ".." && !segment.contains('\\'))
    }

    /// The basename as it appears on disk (`_comment` for partials).
    pub fn file_stem(&self) -> String {
        if self.partial {
            format!("{PARTIAL_PREFIX}{}", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Reconstruct the virtual path.
    pub fn virtual_path(&self) -> String {
        if self.prefix.is_empty() {
            self.file_stem()
        } else {
            format!("{}/{}", self.prefix, self.file_stem())
        }
    }
}

impl fmt::Display for TemplatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.virtual_path())
    }
}

/// A template filename split into its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedFilename {
    pub(crate) path: TemplatePath,
    pub(crate) format: Option<String>,
    pub(crate) handler: String,
}

/// Split a view-relative filename such as `articles/_comment.html.erb`.
///
/// The last extension is the handler and the one before it, if any, the
/// format. Files without an extension are not templates.
pub(crate) fn parse_filename(relative: &str) -> Option<ParsedFilename> {
    let (dir, base) = match relative.rsplit_once('/') {
        Some((dir, base)) => (dir, base),
        None => ("", relative),
    };
    let mut parts = base.split('.');
    let stem = parts.next().filter(|s| !s.is_empty())?;
    let extensions: Vec<&str> = parts.collect();
    let (handler, format) = match extensions.as_slice() {
        [] => return None,
        [handler] => (*handler, None),
        [.., format, handler] => (*handler, Some((*format).to_string())),
    };
    if handler.is_empty() {
        return None;
    }

    let virtual_path = if dir.is_empty() {
        stem.to_string()
    } else {
        format!("{dir}/{stem}")
    };
    Some(ParsedFilename {
        path: TemplatePath::parse(&virtual_path),
        format,
        handler: handler.to_string(),
    })
}
