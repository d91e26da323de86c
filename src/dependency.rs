//! Dependency ordering for continuous effects.
//!
//! Effects in the same layer (and sublayer for power/toughness) normally
//! apply in timestamp order. A dependency overrides that: if applying B first
//! would change whether A applies or what A does, B applies before A.
//! Dependencies come from two places: the explicit `depends_on` list an
//! effect declares, and a small set of inferred rules (stripping all
//! abilities depends on every ability grant in the same layer). Cycles fall
//! back to pure timestamp order.

use std::collections::{HashMap, HashSet};

use crate::continuous::{ContinuousEffect, EffectSourceType, Layer, Modification, PtSublayer};

/// Whether effect `a` depends on effect `b` (i.e. `b` must apply first).
pub fn effect_depends_on(a: &ContinuousEffect, b: &ContinuousEffect) -> bool {
    if a.layer() != b.layer() {
        return false;
    }
    if a.layer() == Layer::PowerToughness && a.pt_sublayer() != b.pt_sublayer() {
        return false;
    }

    // A characteristic-defining effect never depends on a non-defining one,
    // or vice versa.
    let a_cda = a.source_type == EffectSourceType::CharacteristicDefining;
    let b_cda = b.source_type == EffectSourceType::CharacteristicDefining;
    if a_cda != b_cda {
        return false;
    }

    if a.depends_on.contains(&b.id) {
        return true;
    }

    inferred_dependency(&a.modification, &b.modification)
}

/// Structural dependencies that hold regardless of declarations.
fn inferred_dependency(a: &Modification, b: &Modification) -> bool {
    match (a, b) {
        // Stripping all abilities applies after every grant in the layer, so
        // the granted abilities are removed too.
        (Modification::RemoveAllAbilities, Modification::AddAbility(_)) => true,
        (Modification::AddAbility(_), Modification::RemoveAllAbilities) => false,
        // Setting colors wipes earlier additions; additions after a set
        // depend on it so the set does not erase them.
        (Modification::AddColors(_), Modification::SetColors(_)) => true,
        _ => false,
    }
}

/// Order effects within one layer (or one sublayer). Dependency-free input
/// sorts by timestamp; otherwise a topological sort runs with timestamp used
/// to break ties, and a cycle degrades the whole group to timestamp order.
pub fn sort_with_dependencies<'a>(effects: &[&'a ContinuousEffect]) -> Vec<&'a ContinuousEffect> {
    if effects.len() <= 1 {
        return effects.to_vec();
    }

    let mut depends_on: HashMap<usize, HashSet<usize>> = HashMap::new();
    for i in 0..effects.len() {
        depends_on.insert(i, HashSet::new());
    }

    let mut has_any_dependency = false;
    for i in 0..effects.len() {
        for j in 0..effects.len() {
            if i != j && effect_depends_on(effects[i], effects[j]) {
                depends_on.get_mut(&i).unwrap().insert(j);
                has_any_dependency = true;
            }
        }
    }

    if !has_any_dependency || has_cycle(&depends_on, effects.len()) {
        let mut sorted = effects.to_vec();
        sorted.sort_by_key(|e| e.timestamp);
        return sorted;
    }

    let mut in_degree: Vec<usize> = vec![0; effects.len()];
    for (i, deps) in &depends_on {
        in_degree[*i] = deps.len();
    }

    let mut depended_by: HashMap<usize, Vec<usize>> = HashMap::new();
    for i in 0..effects.len() {
        depended_by.insert(i, Vec::new());
    }
    for (i, deps) in &depends_on {
        for &j in deps {
            depended_by.get_mut(&j).unwrap().push(*i);
        }
    }

    let mut result = Vec::new();
    let mut ready: Vec<usize> = (0..effects.len()).filter(|&i| in_degree[i] == 0).collect();
    // Oldest timestamp pops first.
    ready.sort_by_key(|&i| std::cmp::Reverse(effects[i].timestamp));

    while let Some(idx) = ready.pop() {
        result.push(effects[idx]);
        for &dependent in &depended_by[&idx] {
            in_degree[dependent] -= 1;
            if in_degree[dependent] == 0 {
                ready.push(dependent);
            }
        }
        ready.sort_by_key(|&i| std::cmp::Reverse(effects[i].timestamp));
    }

    result
}

/// Order a whole layer's effects: for the power/toughness layer, group by
/// sublayer first, then dependency-sort within each group.
pub fn sort_layer_effects<'a>(effects: &[&'a ContinuousEffect]) -> Vec<&'a ContinuousEffect> {
    if effects.is_empty() {
        return Vec::new();
    }

    let layer = effects[0].layer();
    if layer != Layer::PowerToughness {
        return sort_with_dependencies(effects);
    }

    let mut by_sublayer: HashMap<Option<PtSublayer>, Vec<&ContinuousEffect>> = HashMap::new();
    for &effect in effects {
        by_sublayer.entry(effect.pt_sublayer()).or_default().push(effect);
    }

    let mut sublayers: Vec<_> = by_sublayer.keys().cloned().collect();
    sublayers.sort();

    let mut result = Vec::new();
    for sublayer in sublayers {
        result.extend(sort_with_dependencies(&by_sublayer[&sublayer]));
    }
    result
}

fn has_cycle(depends_on: &HashMap<usize, HashSet<usize>>, n: usize) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum Mark {
        White,
        Gray,
        Black,
    }

    fn visit(
        node: usize,
        depends_on: &HashMap<usize, HashSet<usize>>,
        marks: &mut [Mark],
    ) -> bool {
        marks[node] = Mark::Gray;
        for &next in &depends_on[&node] {
            match marks[next] {
                Mark::Gray => return true,
                Mark::White => {
                    if visit(next, depends_on, marks) {
                        return true;
                    }
                }
                Mark::Black => {}
            }
        }
        marks[node] = Mark::Black;
        false
    }

    let mut marks = vec![Mark::White; n];
    (0..n).any(|i| marks[i] == Mark::White && visit(i, depends_on, &mut marks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ability::Ability;
    use crate::continuous::{Affected, Duration};
    use crate::ids::{ObjectId, PlayerId};

    fn effect(timestamp: u64, modification: Modification) -> ContinuousEffect {
        let mut e = ContinuousEffect::new(
            ObjectId::new(),
            PlayerId::from_index(0),
            Affected::AllCreatures,
            modification,
            Duration::EndOfGame,
        );
        e.timestamp = timestamp;
        e
    }

    #[test]
    fn test_no_dependency_sorts_by_timestamp() {
        let a = effect(
            20,
            Modification::ModifyPt {
                power: 1,
                toughness: 1,
            },
        );
        let b = effect(
            10,
            Modification::ModifyPt {
                power: 2,
                toughness: 2,
            },
        );
        let sorted = sort_with_dependencies(&[&a, &b]);
        assert_eq!(sorted[0].timestamp, 10);
        assert_eq!(sorted[1].timestamp, 20);
    }

    #[test]
    fn test_remove_all_applies_after_grant_despite_timestamps() {
        // The remover has the older timestamp but still sorts last.
        let remover = effect(1, Modification::RemoveAllAbilities);
        let granter = effect(2, Modification::AddAbility(Ability::static_marker("vigilance")));
        let sorted = sort_with_dependencies(&[&remover, &granter]);
        assert!(matches!(
            sorted[0].modification,
            Modification::AddAbility(_)
        ));
        assert!(matches!(
            sorted[1].modification,
            Modification::RemoveAllAbilities
        ));
    }

    #[test]
    fn test_declared_cycle_falls_back_to_timestamps() {
        let mut a = effect(
            5,
            Modification::ModifyPt {
                power: 1,
                toughness: 0,
            },
        );
        let mut b = effect(
            3,
            Modification::ModifyPt {
                power: 0,
                toughness: 1,
            },
        );
        a.depends_on.push(b.id);
        b.depends_on.push(a.id);
        let sorted = sort_with_dependencies(&[&a, &b]);
        assert_eq!(sorted[0].timestamp, 3);
        assert_eq!(sorted[1].timestamp, 5);
    }

    #[test]
    fn test_sublayers_group_before_dependencies() {
        let set = effect(
            9,
            Modification::SetPt {
                power: 0,
                toughness: 2,
            },
        );
        let modify = effect(
            1,
            Modification::ModifyPt {
                power: 1,
                toughness: 1,
            },
        );
        let switch = effect(2, Modification::SwitchPt);
        let sorted = sort_layer_effects(&[&switch, &modify, &set]);
        assert!(matches!(sorted[0].modification, Modification::SetPt { .. }));
        assert!(matches!(
            sorted[1].modification,
            Modification::ModifyPt { .. }
        ));
        assert!(matches!(sorted[2].modification, Modification::SwitchPt));
    }
}
