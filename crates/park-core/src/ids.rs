// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 the park-core authors

use std::fmt;
use std::sync::Arc;

/// Addressing key for an agent on the [`Bus`](crate::bus::Bus).
///
/// Cheap to clone (an `Arc<str>` underneath) and hashable, standing in for a
/// JID-style endpoint address. Two `EndpointId`s are equal iff their text is
/// equal.
#[derive(Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct EndpointId(Arc<str>);

impl EndpointId {
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        EndpointId(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EndpointId({})", self.0)
    }
}

impl From<&str> for EndpointId {
    fn from(s: &str) -> Self {
        EndpointId(Arc::from(s))
    }
}

impl From<String> for EndpointId {
    fn from(s: String) -> Self {
        EndpointId(Arc::from(s.as_str()))
    }
}
