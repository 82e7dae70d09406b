// SPDX-FileCopyrightText: 2026 Google LLC
//
// SPDX-License-Identifier: Apache-2.0

use std::collections::HashSet;

use fw_common::{gen_rule_graph, reachable, rule_file_name, write_rule_graph, GenRuleFile};
use libopencm3_build::{paths::normalize, RuleSetResolver};
use proptest::prelude::*;
use test_strategy::proptest;


fn has_duplicates<T: std::hash::Hash + Eq>(items: &[T]) -> bool {
    let mut seen = HashSet::new();
    !items.iter().all(|item| seen.insert(item))
}

// Every reachable file is parsed exactly once, in breadth-first order, even
// with cycles and self-includes.
#[proptest(ProptestConfig { cases: 64, ..ProptestConfig::default() })]
fn each_reachable_file_parsed_once(#[strategy(gen_rule_graph(6))] graph: Vec<GenRuleFile>) {
    let dir = tempfile::tempdir().unwrap();
    write_rule_graph(dir.path(), &graph);

    let merged = RuleSetResolver::new().resolve(dir.path()).unwrap();

    let expected: Vec<_> = reachable(&graph)
        .into_iter()
        .map(|index| normalize(&dir.path().join(rule_file_name(index))))
        .collect();
    prop_assert_eq!(&merged.files, &expected);
    prop_assert!(merged.files.len() <= graph.len());
}

#[proptest(ProptestConfig { cases: 64, ..ProptestConfig::default() })]
fn merged_lists_are_ordered_unions(#[strategy(gen_rule_graph(6))] graph: Vec<GenRuleFile>) {
    let dir = tempfile::tempdir().unwrap();
    write_rule_graph(dir.path(), &graph);

    let merged = RuleSetResolver::new().resolve(dir.path()).unwrap();
    let rules = &merged.rules;

    prop_assert!(!has_duplicates(&rules.includes));
    prop_assert!(!has_duplicates(&rules.search_paths));
    prop_assert!(!has_duplicates(&rules.objects));
    prop_assert_eq!(rules.search_paths[0].as_str(), "./");

    let mut objects = vec![];
    for index in reachable(&graph) {
        for obj in &graph[index].objects {
            let obj = format!("{obj}.o");
            if !objects.contains(&obj) {
                objects.push(obj);
            }
        }
    }
    prop_assert_eq!(&rules.objects, &objects);
}

#[proptest(ProptestConfig { cases: 32, ..ProptestConfig::default() })]
fn resolving_twice_gives_same_result(#[strategy(gen_rule_graph(5))] graph: Vec<GenRuleFile>) {
    let dir = tempfile::tempdir().unwrap();
    write_rule_graph(dir.path(), &graph);

    let resolver = RuleSetResolver::new();
    let first = resolver.resolve(dir.path()).unwrap();
    let second = resolver.resolve(dir.path()).unwrap();
    prop_assert_eq!(first, second);
}
