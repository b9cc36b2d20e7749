
use formflow::{decode_ids, decode_options, encode_ids, encode_options, PossibleOption, Questionnaire};
use proptest::prelude::*;
use strategies::{arb_master_and_subset, arb_master_list, is_subsequence};

fn seeded(master: &[String], items: &[String]) -> Questionnaire {
    let mut q = Questionnaire::new("q");
    q.set_master_list(master.iter().cloned());
    q.set_items(items.iter().cloned());
    q.set_active_item(Some(items[0].as_str())).unwrap();
    q
}

// ---------------------------------------------------------------------------
// Invariant 1: Master-order placement
//
// Adding a hidden master item with its master neighbour as the anchor keeps
// the visible list a subsequence of the master list, whatever order the
// items come back in. Once everything is visible, the lists are equal.
//
// An append whose whole master prefix is hidden falls back to the tail, so
// the backward anchor is only used while something earlier is visible.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn placement_preserves_master_order(
        (master, items) in arb_master_and_subset(),
        order in prop::collection::vec(any::<prop::sample::Index>(), 0..32),
        use_append in prop::collection::vec(any::<bool>(), 32..=32),
    ) {
        let mut q = seeded(&master, &items);
        let mut hidden: Vec<String> = master
            .iter()
            .filter(|m| !items.contains(m))
            .cloned()
            .collect();

        for (pick, &append) in order.iter().zip(&use_append) {
            if hidden.is_empty() {
                break;
            }
            let id = hidden.remove(pick.index(hidden.len()));
            let mpos = master.iter().position(|m| *m == id).unwrap();
            let earlier_visible = master[..mpos]
                .iter()
                .any(|m| q.items().iter().any(|i| i == m));
            if append && earlier_visible {
                q.append_item(&id, &master[mpos - 1]);
            } else if mpos + 1 < master.len() {
                q.insert_item(&id, &master[mpos + 1]);
            } else {
                q.append_item(&id, &master[mpos - 1]);
            }
            prop_assert!(
                is_subsequence(q.items(), &master),
                "items {:?} are not a subsequence of master {:?}",
                q.items(),
                master,
            );
        }

        if hidden.is_empty() {
            prop_assert_eq!(q.items(), &master[..]);
        }
    }

    #[test]
    fn adding_is_idempotent((master, items) in arb_master_and_subset()) {
        let mut q = seeded(&master, &items);
        let before = q.items().to_vec();
        for id in &items {
            q.append_item(id, &items[0]);
            q.insert_item(id, &items[0]);
        }
        prop_assert_eq!(q.items(), &before[..]);
    }
}

// ---------------------------------------------------------------------------
// Invariant 2: Removal safety
//
// The visible list never becomes empty, and the active item is always a
// member of the visible list.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn removal_never_strands_the_session(
        (master, items) in arb_master_and_subset(),
        order in prop::collection::vec(any::<prop::sample::Index>(), 0..32),
    ) {
        let mut q = seeded(&master, &items);
        for pick in &order {
            let victim = q.items()[pick.index(q.items().len())].clone();
            q.remove_item(&victim);
            prop_assert!(!q.items().is_empty());
            let active = q.active_item().unwrap().to_owned();
            prop_assert!(
                q.items().contains(&active),
                "active item {:?} left the visible list {:?}",
                active,
                q.items(),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Invariant 3: Branch round trip
//
// Any depth of branching followed by the same number of returns restores
// the questionnaire exactly, no matter what happened inside the branches.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn branches_unwind_exactly(
        (master, items) in arb_master_and_subset(),
        branches in prop::collection::vec(arb_master_list(), 1..5),
    ) {
        let mut q = seeded(&master, &items);
        let trunk = q.clone();

        for branch in &branches {
            q.navigation_branch(branch.clone(), &branch[0]).unwrap();
            // arbitrary churn inside the branch
            if branch.len() > 1 {
                q.remove_item(&branch[1].clone());
            }
            q.set_master_list(branch.iter().cloned());
        }
        for _ in &branches {
            q.navigation_return().unwrap();
        }
        prop_assert_eq!(q, trunk);
    }
}

// ---------------------------------------------------------------------------
// Invariant 4: Wire codecs
//
// Whatever survives encoding decodes back to the same data.
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn id_lists_round_trip(ids in arb_master_list()) {
        let encoded = encode_ids(&ids);
        prop_assert_eq!(decode_ids(&encoded), ids);
    }

    #[test]
    fn option_lists_round_trip(
        raw in prop::collection::vec(
            (
                prop::option::of("[a-zA-Z0-9 =_-]{1,12}"),
                prop::option::of("[a-zA-Z0-9 ,=_-]{1,20}"),
            ),
            1..8,
        ),
    ) {
        let options: Vec<PossibleOption> = raw
            .into_iter()
            .map(|(value, label)| PossibleOption {
                // the encoding reserves these two spellings
                value: value.filter(|v| v != "null"),
                label: label.filter(|l| !l.is_empty()),
            })
            .collect();
        let encoded = encode_options(&options).unwrap();
        prop_assert_eq!(decode_options(&encoded).unwrap(), options);
    }
}
