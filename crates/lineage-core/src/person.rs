//! Person entity: identity, attributes and direct relation references.
//!
//! Persons never hold references to each other. Every relation is stored as a
//! [`PersonId`] that is resolved through the owning [`Lineage`](crate::lineage::Lineage).

use crate::error::LineageError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable identifier of a person within one lineage. Displayed as `P<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonId(u64);

impl PersonId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PersonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

impl FromStr for PersonId {
    type Err = LineageError;

    /// Accepts `7` as well as `P7` / `p7`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let digits = s
            .strip_prefix('P')
            .or_else(|| s.strip_prefix('p'))
            .unwrap_or(s);
        digits
            .parse::<u64>()
            .ok()
            .filter(|n| *n > 0)
            .map(Self)
            .ok_or_else(|| LineageError::NotFound(format!("{s:?} is not a person ID")))
    }
}

/// Gender of a person. Decides the father/mother and husband/wife slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Gender {
    pub fn code(self) -> &'static str {
        match self {
            Self::Male => "m",
            Self::Female => "f",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Gender {
    type Err = LineageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "m" | "male" => Ok(Self::Male),
            "f" | "female" => Ok(Self::Female),
            _ => Err(LineageError::InvalidGender(s.to_string())),
        }
    }
}

/// How a relative stands in relation to a given person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationKind {
    Father,
    Mother,
    Son,
    Daughter,
    Husband,
    Wife,
}

impl RelationKind {
    /// The kind a parent of the given gender occupies.
    pub fn parent(gender: Gender) -> Self {
        match gender {
            Gender::Male => Self::Father,
            Gender::Female => Self::Mother,
        }
    }

    /// The kind a child of the given gender occupies.
    pub fn child(gender: Gender) -> Self {
        match gender {
            Gender::Male => Self::Son,
            Gender::Female => Self::Daughter,
        }
    }

    /// The kind a spouse of the given gender occupies.
    pub fn spouse(gender: Gender) -> Self {
        match gender {
            Gender::Male => Self::Husband,
            Gender::Female => Self::Wife,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Father => "father",
            Self::Mother => "mother",
            Self::Son => "son",
            Self::Daughter => "daughter",
            Self::Husband => "husband",
            Self::Wife => "wife",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One individual of the family graph.
///
/// Relation fields are only written by [`Lineage`](crate::lineage::Lineage),
/// which updates both ends of an edge together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
    id: PersonId,
    name: String,
    gender: Gender,
    father: Option<PersonId>,
    mother: Option<PersonId>,
    children: Vec<PersonId>,
    spouse: Option<PersonId>,
}

impl Person {
    pub(crate) fn new(id: PersonId, name: String, gender: Gender) -> Self {
        Self {
            id,
            name,
            gender,
            father: None,
            mother: None,
            children: Vec::new(),
            spouse: None,
        }
    }

    pub fn id(&self) -> PersonId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gender(&self) -> Gender {
        self.gender
    }

    pub fn father(&self) -> Option<PersonId> {
        self.father
    }

    pub fn mother(&self) -> Option<PersonId> {
        self.mother
    }

    /// Father first, then mother.
    pub fn parents(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.father.into_iter().chain(self.mother)
    }

    /// Children in ID order.
    pub fn children(&self) -> &[PersonId] {
        &self.children
    }

    pub fn spouse(&self) -> Option<PersonId> {
        self.spouse
    }

    pub fn has_parent(&self, id: PersonId) -> bool {
        self.father == Some(id) || self.mother == Some(id)
    }

    pub fn has_child(&self, id: PersonId) -> bool {
        self.children.contains(&id)
    }

    /// True when the person has no relation edge of any kind.
    pub fn is_isolated(&self) -> bool {
        self.father.is_none()
            && self.mother.is_none()
            && self.children.is_empty()
            && self.spouse.is_none()
    }

    /// The parent slot a parent of `gender` would occupy.
    pub(crate) fn parent_slot(&self, gender: Gender) -> Option<PersonId> {
        match gender {
            Gender::Male => self.father,
            Gender::Female => self.mother,
        }
    }

    pub(crate) fn parent_slot_mut(&mut self, gender: Gender) -> &mut Option<PersonId> {
        match gender {
            Gender::Male => &mut self.father,
            Gender::Female => &mut self.mother,
        }
    }

    /// Insert keeping `children` sorted by id.
    pub(crate) fn push_child(&mut self, id: PersonId) {
        if let Err(pos) = self.children.binary_search(&id) {
            self.children.insert(pos, id);
        }
    }

    pub(crate) fn drop_child(&mut self, id: PersonId) {
        self.children.retain(|c| *c != id);
    }

    /// Clear whichever parent slot holds `id`.
    pub(crate) fn drop_parent(&mut self, id: PersonId) {
        if self.father == Some(id) {
            self.father = None;
        }
        if self.mother == Some(id) {
            self.mother = None;
        }
    }

    pub(crate) fn set_spouse(&mut self, spouse: Option<PersonId>) {
        self.spouse = spouse;
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.id, self.name)
    }
}
