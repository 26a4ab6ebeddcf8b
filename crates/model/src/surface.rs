//! Surface model — one release's public API snapshot.
//!
//! Built by an external extractor and consumed read-only by the policy
//! rules, which only need class visibility, member abstractness, and the
//! evolution-metadata tags.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::member::MemberId;

/// Evolution-metadata tags carried by a member in a snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberTags {
    /// Marked as experimental / incubating API.
    pub experimental: bool,
    /// Release the member was introduced in, if declared.
    pub since: Option<String>,
}

/// A single member of a public class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiMember {
    pub id: MemberId,
    pub is_abstract: bool,
    pub tags: MemberTags,
}

impl ApiMember {
    pub fn new(id: MemberId) -> Self {
        ApiMember {
            id,
            is_abstract: false,
            tags: MemberTags::default(),
        }
    }
}

/// A class in the public surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiClass {
    pub name: String,
    pub is_public: bool,
    members: BTreeMap<MemberId, ApiMember>,
}

impl ApiClass {
    pub fn new(name: &str, is_public: bool) -> Self {
        ApiClass {
            name: name.to_string(),
            is_public,
            members: BTreeMap::new(),
        }
    }

    pub fn add_member(&mut self, member: ApiMember) {
        self.members.insert(member.id.clone(), member);
    }

    pub fn member(&self, id: &MemberId) -> Option<&ApiMember> {
        self.members.get(id)
    }
}

/// A full public API snapshot, classes keyed by fully-qualified name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApiSurface {
    classes: BTreeMap<String, ApiClass>,
}

impl ApiSurface {
    pub fn new() -> Self {
        ApiSurface {
            classes: BTreeMap::new(),
        }
    }

    pub fn add_class(&mut self, class: ApiClass) {
        self.classes.insert(class.name.clone(), class);
    }

    pub fn class(&self, name: &str) -> Option<&ApiClass> {
        self.classes.get(name)
    }

    /// Look up a member via its owning class.
    pub fn member(&self, id: &MemberId) -> Option<&ApiMember> {
        self.classes.get(&id.owner).and_then(|c| c.member(id))
    }
}
