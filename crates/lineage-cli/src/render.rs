//! Plain-text views of persons, relations and paths.

use lineage_core::lineage::Lineage;
use lineage_core::paths::PersonPath;
use lineage_core::person::{Person, PersonId};
use std::fmt::Write;

/// Labelled detail lines for one person, in display order.
/// Relation lines are only present when the relation exists.
pub fn person_details(lineage: &Lineage, person: &Person) -> Vec<(&'static str, String)> {
    let id = person.id();
    let mut lines = vec![
        ("ID", id.get().to_string()),
        ("Name", person.name().to_string()),
    ];
    if let Some(f) = lineage.father(id) {
        lines.push(("Father", f.to_string()));
    }
    if let Some(m) = lineage.mother(id) {
        lines.push(("Mother", m.to_string()));
    }
    if let Some(h) = lineage.husband(id) {
        lines.push(("Husband", h.to_string()));
    }
    if let Some(w) = lineage.wife(id) {
        lines.push(("Wife", w.to_string()));
    }
    let sons = lineage.sons(id);
    if !sons.is_empty() {
        lines.push(("Son", person_list(&sons)));
    }
    let daughters = lineage.daughters(id);
    if !daughters.is_empty() {
        lines.push(("Daughter", person_list(&daughters)));
    }
    lines
}

/// `P1(Alice), P2(Bob)`.
pub fn person_list(persons: &[&Person]) -> String {
    persons
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// One-line summary used by listings.
pub fn person_summary(person: &Person) -> String {
    format!("{} [{}]", person, person.gender())
}

/// `P1(Alice) --husband--> P2(Bob) --son--> P3(Carl)`.
pub fn path_line(lineage: &Lineage, path: &PersonPath) -> String {
    let mut out = String::new();
    for (i, id) in path.persons.iter().enumerate() {
        if i > 0 {
            let step = path.steps[i - 1];
            let _ = write!(out, " --{step}--> ");
        }
        out.push_str(&label(lineage, *id));
    }
    out
}

fn label(lineage: &Lineage, id: PersonId) -> String {
    lineage
        .find_person_by_id(id)
        .map_or_else(|| id.to_string(), |p| p.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lineage_core::person::Gender;

    #[test]
    fn test_person_details_lists_present_relations_only() {
        let mut l = Lineage::new();
        let dad = l.add_person("Bob", Gender::Male).unwrap().id();
        let mom = l.add_person("Alice", Gender::Female).unwrap().id();
        let son = l.add_person("Dan", Gender::Male).unwrap().id();
        let daughter = l.add_person("Eve", Gender::Female).unwrap().id();
        l.add_spouse(dad, mom).unwrap();
        l.add_child(dad, son).unwrap();
        l.add_child(dad, daughter).unwrap();

        let details = person_details(&l, l.find_person_by_id(dad).unwrap());
        assert_eq!(
            details,
            vec![
                ("ID", "1".to_string()),
                ("Name", "Bob".to_string()),
                ("Wife", "P2(Alice)".to_string()),
                ("Son", "P3(Dan)".to_string()),
                ("Daughter", "P4(Eve)".to_string()),
            ]
        );

        let details = person_details(&l, l.find_person_by_id(son).unwrap());
        assert_eq!(details[2], ("Father", "P1(Bob)".to_string()));
        assert_eq!(details.len(), 3);
    }

    #[test]
    fn test_path_line() {
        let mut l = Lineage::new();
        let a = l.add_person("Alice", Gender::Female).unwrap().id();
        let b = l.add_person("Bob", Gender::Male).unwrap().id();
        let c = l.add_person("Carl", Gender::Male).unwrap().id();
        l.add_spouse(a, b).unwrap();
        l.add_parent(c, b).unwrap();
        let path = l.shortest_path(a, c).unwrap().unwrap();
        assert_eq!(
            path_line(&l, &path),
            "P1(Alice) --husband--> P2(Bob) --son--> P3(Carl)"
        );
    }

    #[test]
    fn test_person_summary() {
        let mut l = Lineage::new();
        let p = l.add_person("Alice", Gender::Female).unwrap();
        assert_eq!(person_summary(p), "P1(Alice) [f]");
    }
}
