//! The family graph: person arena, relation rules and queries.

use crate::error::{LineageError, Result};
use crate::paths::{self, PersonPath};
use crate::person::{Gender, Person, PersonId, RelationKind};
use crate::storage;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// All persons of a genealogy plus the id counter.
///
/// Persons are addressed by [`PersonId`] everywhere. Ids grow monotonically,
/// so iterating the map in key order is insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage {
    persons: BTreeMap<PersonId, Person>,
    next_id: u64,
}

/// Tag of an undirected edge in [`Lineage::all_relations`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationType {
    /// `source` is a parent of `target`.
    ParentChild,
    /// `source` and `target` are married; `source` has the lower id.
    Spouse,
}

/// One undirected edge of the graph with both endpoints resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub kind: RelationType,
    pub source: PersonId,
    pub source_name: String,
    pub target: PersonId,
    pub target_name: String,
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verb = match self.kind {
            RelationType::ParentChild => "parent of",
            RelationType::Spouse => "spouse of",
        };
        write!(
            f,
            "{}({}) is {} {}({})",
            self.source, self.source_name, verb, self.target, self.target_name
        )
    }
}

impl Default for Lineage {
    fn default() -> Self {
        Self::new()
    }
}

impl Lineage {
    /// Create an empty lineage. The first person gets id 1.
    pub fn new() -> Self {
        Self {
            persons: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.persons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty()
    }

    /// The id the next added person will receive.
    pub fn next_id(&self) -> PersonId {
        PersonId::new(self.next_id)
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.persons.contains_key(&id)
    }

    /// Add a new isolated person and return it.
    pub fn add_person(&mut self, name: &str, gender: Gender) -> Result<&Person> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LineageError::InvalidName);
        }
        let id = PersonId::new(self.next_id);
        self.next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| LineageError::CorruptData("person ID counter exhausted".to_string()))?;
        debug!(%id, name, gender = gender.label(), "adding person");
        let person = self
            .persons
            .entry(id)
            .or_insert_with(|| Person::new(id, name.to_string(), gender));
        Ok(&*person)
    }

    /// Insert a person with a fixed id while rebuilding from a snapshot.
    pub(crate) fn insert_loaded(&mut self, id: PersonId, name: &str, gender: Gender) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LineageError::CorruptData(format!("{id} has an empty name")));
        }
        if id.get() == 0 || id.get() >= self.next_id {
            return Err(LineageError::CorruptData(format!(
                "{id} is outside the allocated range (next ID {})",
                self.next_id
            )));
        }
        if self.persons.contains_key(&id) {
            return Err(LineageError::CorruptData(format!("duplicate person {id}")));
        }
        self.persons
            .insert(id, Person::new(id, name.to_string(), gender));
        Ok(())
    }

    /// Empty lineage whose counter continues at `next_id`.
    pub(crate) fn with_next_id(next_id: u64) -> Self {
        Self {
            persons: BTreeMap::new(),
            next_id: next_id.max(1),
        }
    }

    pub fn find_person_by_id(&self, id: PersonId) -> Option<&Person> {
        self.persons.get(&id)
    }

    /// Persons whose name contains `query`, in insertion order.
    pub fn find_person_by_name(&self, query: &str, case_sensitive: bool) -> Vec<&Person> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        if case_sensitive {
            self.persons
                .values()
                .filter(|p| p.name().contains(query))
                .collect()
        } else {
            let needle = query.to_lowercase();
            self.persons
                .values()
                .filter(|p| p.name().to_lowercase().contains(&needle))
                .collect()
        }
    }

    /// Remove an isolated person. Its id is never handed out again.
    pub fn remove_person(&mut self, id: PersonId) -> Result<Person> {
        let person = self.person(id)?;
        if !person.is_isolated() {
            return Err(LineageError::HasRelatives(id));
        }
        debug!(%id, "removing person");
        self.persons
            .remove(&id)
            .ok_or_else(|| LineageError::unknown_person(id))
    }

    pub fn all_persons(&self) -> Vec<&Person> {
        self.persons.values().collect()
    }

    /// Every edge once: parent/child from the parent side, spouses from the lower id.
    pub fn all_relations(&self) -> Vec<Relation> {
        let mut relations = Vec::new();
        for person in self.persons.values() {
            for child in person.children() {
                if let Some(c) = self.persons.get(child) {
                    relations.push(Relation {
                        kind: RelationType::ParentChild,
                        source: person.id(),
                        source_name: person.name().to_string(),
                        target: c.id(),
                        target_name: c.name().to_string(),
                    });
                }
            }
            if let Some(spouse) = person.spouse()
                && person.id() < spouse
                && let Some(s) = self.persons.get(&spouse)
            {
                relations.push(Relation {
                    kind: RelationType::Spouse,
                    source: person.id(),
                    source_name: person.name().to_string(),
                    target: s.id(),
                    target_name: s.name().to_string(),
                });
            }
        }
        relations
    }

    // -----------------------------------------------------------------------
    // Relation mutations
    // -----------------------------------------------------------------------

    /// Make `parent` a father or mother of `child`, depending on the parent's gender.
    pub fn add_parent(&mut self, child: PersonId, parent: PersonId) -> Result<()> {
        if child == parent {
            return Err(LineageError::InvalidRelation(format!(
                "{child} cannot be their own parent"
            )));
        }
        let child_p = self.person(child)?;
        let parent_p = self.person(parent)?;
        let kind = RelationKind::parent(parent_p.gender());

        if child_p.has_parent(parent) {
            return Err(LineageError::InvalidRelation(format!(
                "{parent} is already a parent of {child}"
            )));
        }
        if let Some(existing) = child_p.parent_slot(parent_p.gender()) {
            return Err(LineageError::InvalidRelation(format!(
                "{child} already has a {kind} ({existing})"
            )));
        }
        if self.is_descendant(parent, child) {
            return Err(LineageError::InvalidRelation(format!(
                "{parent} is a descendant of {child}"
            )));
        }

        let gender = parent_p.gender();
        // Both ends exist and every check passed; the two writes below cannot fail.
        *self.person_mut(child)?.parent_slot_mut(gender) = Some(parent);
        self.person_mut(parent)?.push_child(child);
        debug!(%child, %parent, %kind, "added parent");
        Ok(())
    }

    /// Inverse of [`add_parent`](Self::add_parent).
    pub fn add_child(&mut self, parent: PersonId, child: PersonId) -> Result<()> {
        self.add_parent(child, parent)
    }

    /// Marry `a` and `b`. Both must currently be unmarried.
    pub fn add_spouse(&mut self, a: PersonId, b: PersonId) -> Result<()> {
        if a == b {
            return Err(LineageError::InvalidRelation(format!(
                "{a} cannot marry themselves"
            )));
        }
        let pa = self.person(a)?;
        let pb = self.person(b)?;
        for p in [pa, pb] {
            if let Some(current) = p.spouse() {
                return Err(LineageError::InvalidRelation(format!(
                    "{} is already married to {current}",
                    p.id()
                )));
            }
        }
        self.person_mut(a)?.set_spouse(Some(b));
        self.person_mut(b)?.set_spouse(Some(a));
        debug!(%a, %b, "added spouse");
        Ok(())
    }

    /// Remove the relation linking `a` and `b` from both sides.
    ///
    /// Returns how `b` stood to `a`. A parent/child edge is removed before a
    /// spouse edge when both exist; call again to remove the other.
    pub fn remove_relation(&mut self, a: PersonId, b: PersonId) -> Result<RelationKind> {
        let pa = self.person(a)?;
        let pb = self.person(b)?;
        let gender_b = pb.gender();
        let b_is_parent = pa.has_parent(b);
        let a_is_parent = pa.has_child(b);
        let married = pa.spouse() == Some(b);

        let kind = if b_is_parent {
            self.person_mut(a)?.drop_parent(b);
            self.person_mut(b)?.drop_child(a);
            RelationKind::parent(gender_b)
        } else if a_is_parent {
            self.person_mut(b)?.drop_parent(a);
            self.person_mut(a)?.drop_child(b);
            RelationKind::child(gender_b)
        } else if married {
            self.person_mut(a)?.set_spouse(None);
            self.person_mut(b)?.set_spouse(None);
            RelationKind::spouse(gender_b)
        } else {
            return Err(LineageError::NotFound(format!(
                "no relation between {a} and {b}"
            )));
        };
        debug!(%a, %b, %kind, "removed relation");
        Ok(kind)
    }

    // -----------------------------------------------------------------------
    // Derived views
    // -----------------------------------------------------------------------

    /// Direct relatives of `person` in the fixed order father, mother, sons,
    /// daughters, spouse. Children are in ID order within each group.
    pub fn neighbors(&self, person: &Person) -> Vec<(RelationKind, PersonId)> {
        let mut out: Vec<(RelationKind, PersonId)> = Vec::new();
        if let Some(f) = person.father() {
            out.push((RelationKind::Father, f));
        }
        if let Some(m) = person.mother() {
            out.push((RelationKind::Mother, m));
        }
        for gender in [Gender::Male, Gender::Female] {
            for child in person.children() {
                if self.persons.get(child).is_some_and(|c| c.gender() == gender) {
                    out.push((RelationKind::child(gender), *child));
                }
            }
        }
        if let Some(s) = person.spouse()
            && let Some(sp) = self.persons.get(&s)
        {
            out.push((RelationKind::spouse(sp.gender()), s));
        }
        out
    }

    /// Relatives grouped by kind; only non-empty groups are present.
    pub fn relatives(&self, id: PersonId) -> Result<BTreeMap<RelationKind, Vec<PersonId>>> {
        let person = self.person(id)?;
        let mut grouped: BTreeMap<RelationKind, Vec<PersonId>> = BTreeMap::new();
        for (kind, rel) in self.neighbors(person) {
            grouped.entry(kind).or_default().push(rel);
        }
        Ok(grouped)
    }

    pub fn father(&self, id: PersonId) -> Option<&Person> {
        self.resolve(self.persons.get(&id)?.father())
    }

    pub fn mother(&self, id: PersonId) -> Option<&Person> {
        self.resolve(self.persons.get(&id)?.mother())
    }

    pub fn sons(&self, id: PersonId) -> Vec<&Person> {
        self.children_of_gender(id, Gender::Male)
    }

    pub fn daughters(&self, id: PersonId) -> Vec<&Person> {
        self.children_of_gender(id, Gender::Female)
    }

    pub fn husband(&self, id: PersonId) -> Option<&Person> {
        self.spouse_of_gender(id, Gender::Male)
    }

    pub fn wife(&self, id: PersonId) -> Option<&Person> {
        self.spouse_of_gender(id, Gender::Female)
    }

    /// Minimum-hop path from `from` to `to`, or `None` when they are not connected.
    pub fn shortest_path(&self, from: PersonId, to: PersonId) -> Result<Option<PersonPath>> {
        paths::shortest_path(self, from, to)
    }

    // -----------------------------------------------------------------------
    // Persistence
    // -----------------------------------------------------------------------

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        storage::save(path, self)
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        storage::load(path)
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn person(&self, id: PersonId) -> Result<&Person> {
        self.persons
            .get(&id)
            .ok_or_else(|| LineageError::unknown_person(id))
    }

    fn person_mut(&mut self, id: PersonId) -> Result<&mut Person> {
        self.persons
            .get_mut(&id)
            .ok_or_else(|| LineageError::unknown_person(id))
    }

    fn resolve(&self, id: Option<PersonId>) -> Option<&Person> {
        id.and_then(|id| self.persons.get(&id))
    }

    fn children_of_gender(&self, id: PersonId, gender: Gender) -> Vec<&Person> {
        self.persons.get(&id).map_or_else(Vec::new, |p| {
            p.children()
                .iter()
                .filter_map(|c| self.persons.get(c))
                .filter(|c| c.gender() == gender)
                .collect()
        })
    }

    fn spouse_of_gender(&self, id: PersonId, gender: Gender) -> Option<&Person> {
        self.resolve(self.persons.get(&id)?.spouse())
            .filter(|s| s.gender() == gender)
    }

    /// True when `candidate` is reachable from `ancestor` through child edges.
    fn is_descendant(&self, candidate: PersonId, ancestor: PersonId) -> bool {
        let mut stack: Vec<PersonId> = vec![ancestor];
        let mut seen: HashSet<PersonId> = HashSet::new();
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            let Some(p) = self.persons.get(&current) else {
                continue;
            };
            for child in p.children() {
                if *child == candidate {
                    return true;
                }
                stack.push(*child);
            }
        }
        false
    }
}
