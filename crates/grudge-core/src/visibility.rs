//! The sole authorization predicate gating cross-user event reads.

use uuid::Uuid;

use grudge_db::Database;

use crate::Result;
use crate::friends::FriendGraph;

pub struct VisibilityGate<'a> {
    db: &'a Database,
}

impl<'a> VisibilityGate<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// A user always sees themself; everyone else needs an accepted
    /// friendship.
    pub fn is_visible(&self, viewer: Uuid, target: Uuid) -> Result<bool> {
        if viewer == target {
            return Ok(true);
        }

        FriendGraph::new(self.db).are_friends(viewer, target)
    }
}
