use git2::Oid;

/// A tag reference as enumerated from the repository
///
/// `target` is the commit the tag peels to; tags pointing at trees or blobs
/// have no target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRef {
    pub name: String,
    pub target: Option<Oid>,
}

impl TagRef {
    pub fn new(name: impl Into<String>, target: Option<Oid>) -> Self {
        TagRef {
            name: name.into(),
            target,
        }
    }
}

/// A tag that resolved to a commit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub target: Oid,
}

impl Tag {
    pub fn new(name: impl Into<String>, target: Oid) -> Self {
        Tag {
            name: name.into(),
            target,
        }
    }
}

impl TagRef {
    /// Peel into a [Tag], or `None` when the tag does not resolve to a commit
    pub fn peeled(&self) -> Option<Tag> {
        self.target.map(|target| Tag::new(self.name.clone(), target))
    }
}
