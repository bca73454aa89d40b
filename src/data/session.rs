//! Open-file sessions and record discovery.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;

use crate::source::{OutputSource, SourceError, SourceFactory};

/// One open output file: its identifier (the path it was opened from), a
/// short display name and the backend handle.
pub struct FileSession {
    id: String,
    name: String,
    source: Box<dyn OutputSource>,
}

impl FileSession {
    /// Full path the file was opened from; rows refer to sessions by this.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Last path component, used as the display name and as the prefix of
    /// record paths shown in the dataset table.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &dyn OutputSource {
        self.source.as_ref()
    }
}

/// One node of the browse tree.
#[derive(Debug, Clone)]
pub struct BrowseNode {
    /// Text shown in the tree.
    pub label: String,
    /// Record path relative to the file root, empty for the file node.
    pub path: String,
    /// Identifier of the session this node belongs to.
    pub file: String,
    /// Array shape for datasets, `None` for files and groups.
    pub shape: Option<Vec<usize>>,
    pub children: Vec<BrowseNode>,
}

impl BrowseNode {
    pub fn is_dataset(&self) -> bool {
        self.shape.is_some()
    }
}

/// Group nesting depth enumerated for the browse tree. Groups below this
/// level show up as bare nodes without children.
const BROWSE_DEPTH: usize = 3;

/// The set of currently open files, in open order.
#[derive(Default)]
pub struct SessionSet {
    sessions: Vec<FileSession>,
}

impl SessionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `path` through `factory` and register the session.
    ///
    /// Nothing is registered when loading fails, so a failed open never
    /// leaves a half-created session behind. Opening a path twice replaces
    /// the previous session.
    pub fn open(
        &mut self,
        path: &Path,
        factory: &dyn SourceFactory,
    ) -> Result<&FileSession, SourceError> {
        let source = factory.load(path)?;
        let id = path.to_string_lossy().into_owned();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| id.clone());
        self.sessions.retain(|s| s.id != id);
        tracing::info!(file = %id, "opened output file");
        self.sessions.push(FileSession { id, name, source });
        Ok(self.sessions.last().expect("session just pushed"))
    }

    /// Close the session with the given identifier. Returns whether a
    /// session was removed. Rows referencing the identifier are not
    /// touched; they simply stop resolving.
    pub fn close(&mut self, id: &str) -> bool {
        let before = self.sessions.len();
        self.sessions.retain(|s| s.id != id);
        let removed = self.sessions.len() != before;
        if removed {
            tracing::info!(file = %id, "closed output file");
        }
        removed
    }

    /// Re-read every open file in place.
    pub fn reload_all(&mut self) -> Result<(), SourceError> {
        for session in &mut self.sessions {
            session.source.reload()?;
            tracing::debug!(file = %session.id, "reloaded");
        }
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&FileSession> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FileSession> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Record paths in the given file matching `pattern`. Unknown
    /// identifiers and patterns without matches both yield the empty set.
    pub fn find_matching_records(&self, id: &str, pattern: &Regex) -> BTreeSet<String> {
        match self.get(id) {
            Some(session) => session.source().find_records(pattern),
            None => BTreeSet::new(),
        }
    }

    /// Build the browse tree over all open files, enumerating groups to a
    /// fixed depth.
    pub fn browse_tree(&self) -> Vec<BrowseNode> {
        self.sessions
            .iter()
            .map(|session| BrowseNode {
                label: session.name.clone(),
                path: String::new(),
                file: session.id.clone(),
                shape: None,
                children: browse_children(session, "", 1),
            })
            .collect()
    }
}

fn browse_children(session: &FileSession, group: &str, level: usize) -> Vec<BrowseNode> {
    session
        .source()
        .entries(group)
        .into_iter()
        .map(|entry| {
            let path = if group.is_empty() {
                entry.name.clone()
            } else {
                format!("{group}/{}", entry.name)
            };
            let children = if entry.is_dataset() || level >= BROWSE_DEPTH {
                Vec::new()
            } else {
                browse_children(session, &path, level + 1)
            };
            BrowseNode {
                label: entry.name,
                path,
                file: session.id.clone(),
                shape: entry.shape,
                children,
            }
        })
        .collect()
}
