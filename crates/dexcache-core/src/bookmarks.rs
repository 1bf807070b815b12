//! Bookmarks for the two audiences of the app.
//!
//! A kid and a parent keep separate lists over the same ids; toggling in one
//! never touches the other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Audience {
    Kid,
    Parent,
}

impl Audience {
    pub const ALL: [Audience; 2] = [Audience::Kid, Audience::Parent];

    pub fn as_str(&self) -> &'static str {
        match self {
            Audience::Kid => "kid",
            Audience::Parent => "parent",
        }
    }
}

impl fmt::Display for Audience {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Audience {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "kid" => Ok(Audience::Kid),
            "parent" => Ok(Audience::Parent),
            other => Err(format!("unknown bookmark set '{}' (expected kid or parent)", other)),
        }
    }
}

/// Insertion-ordered set of ids.
///
/// Deserialising drops repeated ids, keeping the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<u32>", into = "Vec<u32>")]
pub struct BookmarkSet {
    ids: Vec<u32>,
}

impl BookmarkSet {
    pub fn contains(&self, id: u32) -> bool {
        self.ids.contains(&id)
    }

    /// Remove `id` if present, otherwise append it. Returns the new membership.
    pub fn toggle(&mut self, id: u32) -> bool {
        if let Some(pos) = self.ids.iter().position(|&b| b == id) {
            self.ids.remove(pos);
            false
        } else {
            self.ids.push(id);
            true
        }
    }

    pub fn ids(&self) -> &[u32] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl From<Vec<u32>> for BookmarkSet {
    fn from(raw: Vec<u32>) -> Self {
        let mut set = BookmarkSet::default();
        for id in raw {
            if !set.contains(id) {
                set.ids.push(id);
            }
        }
        set
    }
}

impl From<BookmarkSet> for Vec<u32> {
    fn from(set: BookmarkSet) -> Self {
        set.ids
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookmarkRegistry {
    kid: BookmarkSet,
    parent: BookmarkSet,
}

impl BookmarkRegistry {
    pub fn new(kid: BookmarkSet, parent: BookmarkSet) -> Self {
        Self { kid, parent }
    }

    pub fn set(&self, audience: Audience) -> &BookmarkSet {
        match audience {
            Audience::Kid => &self.kid,
            Audience::Parent => &self.parent,
        }
    }

    fn set_mut(&mut self, audience: Audience) -> &mut BookmarkSet {
        match audience {
            Audience::Kid => &mut self.kid,
            Audience::Parent => &mut self.parent,
        }
    }

    pub fn toggle(&mut self, audience: Audience, id: u32) -> bool {
        self.set_mut(audience).toggle(id)
    }

    pub fn contains(&self, audience: Audience, id: u32) -> bool {
        self.set(audience).contains(id)
    }
}
