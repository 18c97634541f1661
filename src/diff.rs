//! Decide which of the sender's files the receiver must request.

use crate::manifest::FileDescriptor;
use std::collections::HashMap;

/// Outcome for one sender file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Local file with the same name and hash
    AlreadyHave,
    /// No local file with this name
    Need,
    /// Local file with the same name but a different hash. Not re-requested.
    HashMismatch,
}

impl Decision {
    pub fn is_request(&self) -> bool {
        matches!(self, Decision::Need)
    }
}

/// Index over the receiver's manifest by name. The first entry wins on
/// duplicate names.
pub struct LocalIndex<'a> {
    by_name: HashMap<&'a str, &'a FileDescriptor>,
}

impl<'a> LocalIndex<'a> {
    pub fn new(local: &'a [FileDescriptor]) -> Self {
        let mut by_name = HashMap::with_capacity(local.len());
        for fd in local {
            by_name.entry(fd.name.as_str()).or_insert(fd);
        }
        Self { by_name }
    }

    pub fn decide(&self, remote: &FileDescriptor) -> Decision {
        match self.by_name.get(remote.name.as_str()) {
            None => Decision::Need,
            Some(local) if local.hash == remote.hash => Decision::AlreadyHave,
            Some(_) => Decision::HashMismatch,
        }
    }
}

/// One decision per sender file, in the sender's order.
pub fn diff<'a>(
    remote: &'a [FileDescriptor],
    local: &[FileDescriptor],
) -> Vec<(&'a FileDescriptor, Decision)> {
    let index = LocalIndex::new(local);
    remote.iter().map(|fd| (fd, index.decide(fd))).collect()
}
