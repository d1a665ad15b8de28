//! Identifier paths locating a failure inside a validated value.

use crate::intern::TypeContext;
use flowguard_common::interner::Atom;
use serde::Serialize;
use smallvec::SmallVec;
use std::fmt::Write;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum PathSegment {
    /// The validated binding itself: a parameter name, `arguments`, `value`.
    Root(Atom),
    Index(usize),
    Property(Atom),
}

/// A path such as `args[0].name`.
///
/// Validation pushes and pops segments while it descends, so the path is a
/// stack; recorded errors keep a snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IdentifierPath {
    segments: SmallVec<[PathSegment; 4]>,
}

impl IdentifierPath {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn root(name: Atom) -> Self {
        let mut path = Self::new();
        path.push(PathSegment::Root(name));
        path
    }

    pub fn push(&mut self, segment: PathSegment) {
        self.segments.push(segment);
    }

    pub fn pop(&mut self) -> Option<PathSegment> {
        self.segments.pop()
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// A copy of this path extended by one segment.
    pub fn child(&self, segment: PathSegment) -> Self {
        let mut path = self.clone();
        path.push(segment);
        path
    }

    /// Render the path with names resolved through `ctx`.
    pub fn render(&self, ctx: &TypeContext) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                PathSegment::Root(name) => {
                    if !out.is_empty() {
                        out.push('.');
                    }
                    out.push_str(&ctx.resolve_atom(*name));
                }
                PathSegment::Index(index) => {
                    let _ = write!(out, "[{index}]");
                }
                PathSegment::Property(name) => {
                    out.push('.');
                    out.push_str(&ctx.resolve_atom(*name));
                }
            }
        }
        out
    }
}
