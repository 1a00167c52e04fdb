//! Working out which repositories still need to be mirrored.

use std::collections::HashSet;

use crate::repo::Repository;

/// Find every repository in `source` whose bare name doesn't appear anywhere
/// in `destination`.
///
/// Namespaces are ignored when comparing, so `team-a/x` counts as present if
/// the destination has `team-b/x`. The result keeps the order of `source`.
pub fn find_missing(source: &[Repository], destination: &[Repository]) -> Vec<Repository> {
    let present: HashSet<&str> = destination.iter().map(|repo| repo.name()).collect();

    source
        .iter()
        .filter(|repo| !present.contains(repo.name()))
        .cloned()
        .collect()
}
