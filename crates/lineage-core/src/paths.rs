//! Shortest relationship path between two persons.
//!
//! The family graph is searched as undirected and unweighted: parent, child and
//! spouse edges all count as one hop. Siblings are two hops apart (through a
//! shared parent).

use crate::error::{LineageError, Result};
use crate::lineage::Lineage;
use crate::person::{PersonId, RelationKind};
use std::collections::{HashMap, VecDeque};

/// A path through the family graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonPath {
    /// Person ids from source to target, both inclusive.
    pub persons: Vec<PersonId>,
    /// `steps[i]` is how `persons[i + 1]` relates to `persons[i]`.
    pub steps: Vec<RelationKind>,
}

impl PersonPath {
    /// Number of hops.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// True for the zero-hop path from a person to itself.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Breadth-first search from `from` to `to`.
///
/// Neighbors are expanded in the order father, mother, sons, daughters,
/// spouse, so among equal-length paths the first one found under that order
/// wins. Returns `Ok(None)` when the two persons are not connected.
pub fn shortest_path(lineage: &Lineage, from: PersonId, to: PersonId) -> Result<Option<PersonPath>> {
    if !lineage.contains(from) {
        return Err(LineageError::unknown_person(from));
    }
    if !lineage.contains(to) {
        return Err(LineageError::unknown_person(to));
    }
    if from == to {
        return Ok(Some(PersonPath {
            persons: vec![from],
            steps: Vec::new(),
        }));
    }

    // person -> (predecessor, how person relates to predecessor)
    let mut came_from: HashMap<PersonId, (PersonId, RelationKind)> = HashMap::new();
    let mut queue: VecDeque<PersonId> = VecDeque::new();
    queue.push_back(from);

    while let Some(current) = queue.pop_front() {
        let Some(person) = lineage.find_person_by_id(current) else {
            continue;
        };
        for (kind, neighbor) in lineage.neighbors(person) {
            if neighbor == from || came_from.contains_key(&neighbor) {
                continue;
            }
            came_from.insert(neighbor, (current, kind));
            if neighbor == to {
                return Ok(Some(reconstruct(&came_from, from, to)));
            }
            queue.push_back(neighbor);
        }
    }

    Ok(None)
}

fn reconstruct(
    came_from: &HashMap<PersonId, (PersonId, RelationKind)>,
    from: PersonId,
    to: PersonId,
) -> PersonPath {
    let mut persons = vec![to];
    let mut steps = Vec::new();
    let mut current = to;
    while current != from {
        let Some(&(prev, kind)) = came_from.get(&current) else {
            break;
        };
        steps.push(kind);
        persons.push(prev);
        current = prev;
    }
    persons.reverse();
    steps.reverse();
    PersonPath { persons, steps }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::person::Gender;

    fn add(l: &mut Lineage, name: &str, gender: Gender) -> PersonId {
        l.add_person(name, gender).unwrap().id()
    }

    #[test]
    fn test_simple_path() {
        let mut l = Lineage::new();
        let a = add(&mut l, "Grandpa", Gender::Male);
        let b = add(&mut l, "Dad", Gender::Male);
        let c = add(&mut l, "Kid", Gender::Female);
        l.add_parent(b, a).unwrap();
        l.add_parent(c, b).unwrap();

        let path = shortest_path(&l, a, c).unwrap().unwrap();
        assert_eq!(path.persons, vec![a, b, c]);
        assert_eq!(path.steps, vec![RelationKind::Son, RelationKind::Daughter]);
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn test_siblings_are_two_hops() {
        let mut l = Lineage::new();
        let mom = add(&mut l, "Mom", Gender::Female);
        let s1 = add(&mut l, "Ann", Gender::Female);
        let s2 = add(&mut l, "Ben", Gender::Male);
        l.add_child(mom, s1).unwrap();
        l.add_child(mom, s2).unwrap();

        let path = shortest_path(&l, s1, s2).unwrap().unwrap();
        assert_eq!(path.persons, vec![s1, mom, s2]);
        assert_eq!(path.steps, vec![RelationKind::Mother, RelationKind::Son]);
    }

    #[test]
    fn test_no_path() {
        let mut l = Lineage::new();
        let a = add(&mut l, "Alice", Gender::Female);
        let b = add(&mut l, "Bob", Gender::Male);
        assert!(shortest_path(&l, a, b).unwrap().is_none());
    }

    #[test]
    fn test_same_source_target() {
        let mut l = Lineage::new();
        let a = add(&mut l, "Alice", Gender::Female);
        let path = shortest_path(&l, a, a).unwrap().unwrap();
        assert_eq!(path.persons, vec![a]);
        assert!(path.is_empty());
    }

    #[test]
    fn test_unknown_person() {
        let mut l = Lineage::new();
        let a = add(&mut l, "Alice", Gender::Female);
        assert!(matches!(
            shortest_path(&l, a, PersonId::new(99)),
            Err(LineageError::NotFound(_))
        ));
    }

    #[test]
    fn test_tie_break_prefers_father_side() {
        // Kid reaches Grandma through both parents; the father is expanded first.
        let mut l = Lineage::new();
        let grandma = add(&mut l, "Grandma", Gender::Female);
        let dad = add(&mut l, "Dad", Gender::Male);
        let mom = add(&mut l, "Mom", Gender::Female);
        let kid = add(&mut l, "Kid", Gender::Male);
        l.add_child(grandma, mom).unwrap();
        l.add_child(grandma, dad).unwrap();
        l.add_parent(kid, mom).unwrap();
        l.add_parent(kid, dad).unwrap();

        let path = shortest_path(&l, kid, grandma).unwrap().unwrap();
        assert_eq!(path.persons, vec![kid, dad, grandma]);
    }
}
