//! Property tests for tree reconciliation.
//!
//! Trees are drawn from a small uid pool so collisions are common.

use std::borrow::Cow;
use std::collections::HashSet;

use proptest::prelude::*;
use serde_json::json;
use uidfix::core::generator::UidGenerator;
use uidfix::core::invariants::{collect_uids, find_duplicate_uids};
use uidfix::core::reconcile::{WithUidMappings, reconcile, reconcile_generic};
use uidfix::test_support::{
    array, bare_element, conditional, data_uid_attribute, element, element_access, fragment,
    function_call, identifier, map_expression, object, other_javascript, property_access, text,
    value,
};
use uidfix::tree::{Attribute, ElementLike, Node};

fn uid() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "aaa", "aab", "root", "t1"]).prop_map(str::to_string)
}

fn leaf() -> impl Strategy<Value = Node> {
    prop_oneof![
        (uid(), "[a-z]{0,4}").prop_map(|(uid, body)| text(&uid, &body)),
        (uid(), any::<i64>()).prop_map(|(uid, n)| value(&uid, json!(n))),
        (uid(), "[a-z]{1,3}").prop_map(|(uid, name)| identifier(&uid, &name)),
    ]
}

fn tree() -> impl Strategy<Value = Node> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        let children = prop::collection::vec(inner.clone(), 0..4);
        let accessors = prop_oneof![
            (uid(), inner.clone(), "[a-z]{1,3}")
                .prop_map(|(uid, on, property)| property_access(&uid, on, &property)),
            (uid(), inner.clone(), inner.clone())
                .prop_map(|(uid, on, index)| element_access(&uid, on, index)),
            (uid(), inner.clone(), inner.clone())
                .prop_map(|(uid, x, y)| object(&uid, vec![("x", x), ("y", y)])),
            (uid(), inner.clone(), children.clone()).prop_map(|(uid, spread, c)| {
                let props = vec![Attribute::spread(spread), data_uid_attribute(&uid)];
                bare_element("div", &uid, props, c)
            }),
        ];
        let containers = prop_oneof![
            (uid(), children.clone()).prop_map(|(uid, c)| element("div", &uid, c)),
            (uid(), children.clone())
                .prop_map(|(uid, c)| bare_element("span", &uid, Vec::new(), c)),
            (uid(), children.clone()).prop_map(|(uid, c)| fragment(&uid, c)),
            (uid(), children.clone()).prop_map(|(uid, c)| function_call(&uid, "f", c)),
            (uid(), children.clone()).prop_map(|(uid, c)| array(&uid, c)),
            (uid(), inner.clone(), inner.clone(), inner.clone())
                .prop_map(|(uid, cond, yes, no)| conditional(&uid, cond, yes, no)),
            (uid(), inner.clone(), inner.clone())
                .prop_map(|(uid, list, f)| map_expression(&uid, list, f)),
            (uid(), uid(), children).prop_map(|(uid, inner_uid, c)| {
                let embedded = match element("p", &inner_uid, c) {
                    Node::Element(inner) => ElementLike::Element(inner),
                    _ => unreachable!("element builder returns an element"),
                };
                other_javascript(&uid, "f()", vec![embedded])
            }),
        ];
        prop_oneof![containers, accessors]
    })
}

fn fix(tree: &Node, used: &mut HashSet<String>) -> WithUidMappings<Node> {
    let result = reconcile_generic(tree, used, &mut UidGenerator::deterministic())
        .expect("reconcile");
    WithUidMappings {
        mappings: result.mappings,
        value: result.value.into_owned(),
    }
}

proptest! {
    #[test]
    fn fixed_trees_have_unique_uids(tree in tree()) {
        let mut used = HashSet::new();
        let fixed = fix(&tree, &mut used);

        prop_assert!(find_duplicate_uids(&fixed.value).is_empty());
        prop_assert_eq!(fixed.value.kind(), tree.kind());

        let mut claimed = HashSet::new();
        collect_uids(&fixed.value, &mut claimed);
        prop_assert!(claimed.is_subset(&used));
        for mapping in &fixed.mappings {
            prop_assert!(used.contains(&mapping.new_uid));
        }
    }

    #[test]
    fn seeded_uids_are_never_reused(
        tree in tree(),
        seeded in prop::collection::hash_set(uid(), 0..4),
    ) {
        let mut used = seeded.clone();
        let fixed = fix(&tree, &mut used);

        let mut claimed = HashSet::new();
        collect_uids(&fixed.value, &mut claimed);
        prop_assert!(claimed.is_disjoint(&seeded));
    }

    #[test]
    fn fixing_twice_changes_nothing(tree in tree()) {
        let fixed = fix(&tree, &mut HashSet::new());

        let again = reconcile(&fixed.value, &mut HashSet::new(), &mut UidGenerator::deterministic())
            .expect("reconcile again");
        prop_assert!(matches!(again.value, Cow::Borrowed(_)));
        prop_assert!(again.mappings.is_empty());
    }
}
