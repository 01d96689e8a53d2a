//! The capability check every resource handler goes through.
//!
//! Two roles exist: administrators get full read/write, everyone else is
//! read-only. Ownership scoping of reads happens in the queries themselves;
//! this module only decides whether the verb is allowed at all, so the same
//! rule applies uniformly to every collection.

use crate::{auth::Principal, Error};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl Action {
    /// The safe methods: GET/HEAD/OPTIONS on collections and objects.
    pub fn is_read(self) -> bool {
        matches!(self, Action::List | Action::Get)
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let desc = match self {
            Action::List => "list",
            Action::Get => "get",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
        };

        f.write_str(desc)
    }
}

impl Principal {
    pub fn check(&self, action: Action) -> Result<(), Error> {
        if self.is_admin || action.is_read() {
            Ok(())
        } else {
            Err(Error::ReadOnly(action))
        }
    }
}
