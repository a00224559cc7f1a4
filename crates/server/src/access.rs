//! Request scoping: which company a call targets and whether its subject may
//! perform it.

use std::collections::HashSet;

/// What a request does. `GET` reads, every other method writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read,
    Write,
}

impl core::fmt::Display for Action {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Action::Read => f.write_str("read"),
            Action::Write => f.write_str("write"),
        }
    }
}

/// Permission check run once per request, before the handler.
pub trait Authorizer: Send + Sync {
    fn allows(&self, subject: &str, action: Action) -> bool;
}

/// Lets every subject read and write.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl Authorizer for AllowAll {
    fn allows(&self, _subject: &str, _action: Action) -> bool {
        true
    }
}

/// Listed subjects may only read; everybody else may also write.
#[derive(Clone, Debug, Default)]
pub struct ViewerList {
    viewers: HashSet<String>,
}

impl ViewerList {
    pub fn new(viewers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            viewers: viewers.into_iter().map(Into::into).collect(),
        }
    }
}

impl Authorizer for ViewerList {
    fn allows(&self, subject: &str, action: Action) -> bool {
        action == Action::Read || !self.viewers.contains(subject)
    }
}

/// Company and subject of the current request, set by the tenant middleware.
#[derive(Clone, Debug)]
pub struct Tenant {
    pub company_id: i64,
    pub subject: String,
}
