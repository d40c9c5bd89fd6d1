//! Radix tree node implementation.
//!
//! Each node holds one path segment. Static children are kept sorted for
//! binary search; a node has at most one parameter child and one wildcard
//! child. Parameter names belong to the pattern, so they are stored on the
//! node where the pattern ends rather than on the parameter nodes.

use crate::error::RouterError;
use crate::method_router::MethodRouter;
use crate::params::Params;

/// Type of path segment in the radix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Static path segment (e.g., "users")
    Static,
    /// Named parameter (e.g., ":id")
    Param(String),
    /// Catch-all wildcard (e.g., "*path")
    Wildcard(String),
}

/// A node in the radix tree.
#[derive(Debug, Clone)]
pub struct Node {
    /// The path segment this node represents
    pub segment: String,

    /// The kind of segment
    pub kind: SegmentKind,

    /// Method router for this node (if it's a route endpoint)
    pub methods: Option<MethodRouter>,

    /// Parameter names of the pattern ending here, in path order
    pub param_names: Vec<String>,

    /// Static children, sorted by segment
    pub static_children: Vec<Node>,

    /// Parameter child
    pub param_child: Option<Box<Node>>,

    /// Wildcard child (always a leaf)
    pub wildcard_child: Option<Box<Node>>,
}

impl Node {
    fn with_kind(segment: String, kind: SegmentKind) -> Self {
        Self {
            segment,
            kind,
            methods: None,
            param_names: Vec::new(),
            static_children: Vec::new(),
            param_child: None,
            wildcard_child: None,
        }
    }

    /// Creates a root node for the tree.
    #[must_use]
    pub fn root() -> Self {
        Self::with_kind(String::new(), SegmentKind::Static)
    }

    /// Inserts a concrete pattern (no optional segments) into the tree.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidPattern`] if a wildcard is not the last
    /// segment, a parameter has no name, or a pattern already bound at the
    /// same position names its parameters differently.
    pub fn insert(&mut self, path: &str, methods: MethodRouter) -> Result<(), RouterError> {
        let segments = parse_path(path)?;
        let names: Vec<String> = segments
            .iter()
            .filter_map(|(_, kind)| match kind {
                SegmentKind::Param(name) | SegmentKind::Wildcard(name) => Some(name.clone()),
                SegmentKind::Static => None,
            })
            .collect();

        let leaf = self.leaf_mut(&segments);
        if leaf.methods.is_some() && leaf.param_names != names {
            return Err(RouterError::invalid_pattern(
                path,
                format!(
                    "parameters {names:?} conflict with {:?} of a route bound at the same position",
                    leaf.param_names
                ),
            ));
        }
        leaf.param_names = names;
        match &mut leaf.methods {
            Some(existing) => existing.merge(methods),
            None => leaf.methods = Some(methods),
        }
        Ok(())
    }

    fn leaf_mut(&mut self, segments: &[(String, SegmentKind)]) -> &mut Self {
        let Some(((segment, kind), remaining)) = segments.split_first() else {
            return self;
        };

        let child = match kind {
            SegmentKind::Static => {
                let index = match self
                    .static_children
                    .binary_search_by(|c| c.segment.as_str().cmp(segment))
                {
                    Ok(index) => index,
                    Err(index) => {
                        self.static_children
                            .insert(index, Self::with_kind(segment.clone(), kind.clone()));
                        index
                    }
                };
                &mut self.static_children[index]
            }
            SegmentKind::Param(_) => &mut **self
                .param_child
                .get_or_insert_with(|| Box::new(Self::with_kind(segment.clone(), kind.clone()))),
            SegmentKind::Wildcard(_) => &mut **self
                .wildcard_child
                .get_or_insert_with(|| Box::new(Self::with_kind(segment.clone(), kind.clone()))),
        };
        child.leaf_mut(remaining)
    }

    /// Matches a request path against the tree.
    ///
    /// Returns the method router and extracted parameters if found.
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<(&MethodRouter, Params)> {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let mut values = Vec::new();
        let leaf = self.match_segments(&segments, &mut values)?;
        let methods = leaf.methods.as_ref()?;
        let params: Params = leaf.param_names.iter().cloned().zip(values).collect();
        Some((methods, params))
    }

    fn match_segments<'a>(&'a self, segments: &[&str], values: &mut Vec<String>) -> Option<&'a Self> {
        let Some((segment, remaining)) = segments.split_first() else {
            return self.methods.is_some().then_some(self);
        };

        if let Some(child) = self.find_static_child(segment) {
            if let Some(found) = child.match_segments(remaining, values) {
                return Some(found);
            }
        }

        if let Some(child) = &self.param_child {
            let mark = values.len();
            values.push((*segment).to_string());
            if let Some(found) = child.match_segments(remaining, values) {
                return Some(found);
            }
            values.truncate(mark);
        }

        if let Some(child) = &self.wildcard_child {
            if child.methods.is_some() {
                values.push(segments.join("/"));
                return Some(child.as_ref());
            }
        }

        None
    }

    fn find_static_child(&self, segment: &str) -> Option<&Self> {
        self.static_children
            .binary_search_by(|c| c.segment.as_str().cmp(segment))
            .ok()
            .map(|i| &self.static_children[i])
    }
}

/// Parses a concrete pattern into segments.
fn parse_path(path: &str) -> Result<Vec<(String, SegmentKind)>, RouterError> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let mut segments = Vec::with_capacity(raw.len());

    for (index, segment) in raw.iter().enumerate() {
        let kind = if let Some(name) = segment.strip_prefix(':') {
            if name.is_empty() {
                return Err(RouterError::invalid_pattern(path, "parameter without a name"));
            }
            SegmentKind::Param(name.to_string())
        } else if let Some(name) = segment.strip_prefix('*') {
            if index + 1 != raw.len() {
                return Err(RouterError::invalid_pattern(path, "wildcard must be the last segment"));
            }
            SegmentKind::Wildcard(name.to_string())
        } else {
            SegmentKind::Static
        };
        segments.push(((*segment).to_string(), kind));
    }

    Ok(segments)
}
