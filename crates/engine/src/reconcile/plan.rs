//! Plan: the pure diff between desired and running containers.

use crate::model::Container;

/// What a reconciliation pass has to do.
///
/// `remove` follows running order, `create` and `unchanged` follow
/// declaration order. Membership is decided by structural equality only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Plan {
    pub remove: Vec<Container>,
    pub create: Vec<Container>,
    /// Desired containers that already run; kept as declared so routing
    /// metadata survives into the running set.
    pub unchanged: Vec<Container>,
}

impl Plan {
    pub fn diff(desired: &[Container], running: &[Container]) -> Self {
        let remove = running
            .iter()
            .filter(|r| !desired.contains(r))
            .cloned()
            .collect();

        let (unchanged, create) = desired
            .iter()
            .cloned()
            .partition(|d| running.contains(d));

        Self { remove, create, unchanged }
    }

    pub fn is_noop(&self) -> bool {
        self.remove.is_empty() && self.create.is_empty()
    }
}
