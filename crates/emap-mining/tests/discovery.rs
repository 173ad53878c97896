mod common;

use approx::assert_relative_eq;
use common::{host, ww_pattern, yw_pattern, Contact};
use emap_core::{ContactEdge, Residue, ResidueNode};
use emap_mining::prelude::*;
use emap_mining::report::MISSING_RUN_MESSAGE;
use emap_mining::{Groups, SimilarityEvaluator};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::Arc;

fn discover(
    graph: ResidueGraph,
    hosts: &[Arc<HostStructure>],
    config: MiningConfig,
    option: ClusteringOption,
) -> SubgraphPattern {
    let mut pattern = SubgraphPattern::with_config(graph, 0, hosts.iter().cloned(), config);
    pattern
        .find_protein_subgraphs(option)
        .expect("discovery succeeds");
    pattern
}

fn groups(entries: Vec<(usize, Vec<&str>)>) -> Groups {
    entries
        .into_iter()
        .map(|(k, ids)| (k, ids.into_iter().map(String::from).collect()))
        .collect()
}

/// Four occurrences across three hosts. All but the `3ccc` contact share
/// geometry; the second `1aaa` contact sits far away in the alignment.
fn mixed_hosts() -> Vec<Arc<HostStructure>> {
    vec![
        host(
            "1aaa",
            &[
                Contact::new(10, 20).weight(0.5),
                Contact::new(40, 50)
                    .ca([10.0, 10.0, 0.0], [10.0, 13.8, 0.0])
                    .weight(2.0),
            ],
        ),
        host("2bbb", &[Contact::new(10, 20).weight(1.0)]),
        host(
            "3ccc",
            &[Contact::new(10, 20)
                .ca([0.0, 0.0, 0.0], [6.0, 0.0, 0.0])
                .weight(3.0)],
        ),
    ]
}

fn assert_partition(pattern: &SubgraphPattern, grouping: &Groups) {
    let mut members: Vec<&str> = grouping.values().flatten().map(String::as_str).collect();
    members.sort_unstable();
    let mut ids: Vec<&str> = pattern.occurrences().iter().map(|o| o.id()).collect();
    ids.sort_unstable();
    assert_eq!(members, ids, "every occurrence in exactly one group");

    let keys: Vec<usize> = grouping.keys().copied().collect();
    assert_eq!(keys, (1..=grouping.len()).collect::<Vec<_>>());

    let sizes: Vec<usize> = grouping.values().map(Vec::len).collect();
    assert!(sizes.windows(2).all(|w| w[0] >= w[1]), "sizes {:?}", sizes);
}

#[test]
fn identical_hosts_form_one_group_in_both_metrics() {
    let hosts = vec![
        host("1aaa", &[Contact::new(10, 20)]),
        host("2bbb", &[Contact::new(10, 20)]),
    ];
    let pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );

    let expected = groups(vec![(1, vec!["1aaa_1", "2bbb_2"])]);
    assert_eq!(pattern.structural_groups(), &expected);
    assert_eq!(pattern.sequence_groups(), &expected);
    assert_eq!(pattern.groups(), &expected);
}

#[test]
fn distant_alignment_splits_sequence_groups_only() {
    let hosts = vec![
        host("1aaa", &[Contact::new(10, 20).aligned(100, 200)]),
        host("2bbb", &[Contact::new(10, 20).aligned(150, 260)]),
    ];
    let mut pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Sequence,
    );

    assert_eq!(
        pattern.sequence_groups(),
        &groups(vec![(1, vec!["1aaa_1"]), (2, vec!["2bbb_2"])])
    );
    assert_eq!(
        pattern.structural_groups(),
        &groups(vec![(1, vec!["1aaa_1", "2bbb_2"])])
    );
    assert_eq!(pattern.groups().len(), 2);

    pattern.select_clustering(ClusteringOption::Structural);
    assert_eq!(pattern.groups().len(), 1);
}

#[test]
fn groups_partition_occurrences() {
    let hosts = mixed_hosts();
    let pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );

    let ids: Vec<&str> = pattern.occurrences().iter().map(|o| o.id()).collect();
    assert_eq!(ids, vec!["1aaa_1", "2bbb_2", "1aaa_3", "3ccc_4"]);

    assert_partition(&pattern, pattern.structural_groups());
    assert_partition(&pattern, pattern.sequence_groups());

    assert_eq!(
        pattern.structural_groups(),
        &groups(vec![(1, vec!["1aaa_1", "2bbb_2", "1aaa_3"]), (2, vec!["3ccc_4"])])
    );
    assert_eq!(
        pattern.sequence_groups(),
        &groups(vec![(1, vec!["1aaa_1", "2bbb_2", "3ccc_4"]), (2, vec!["1aaa_3"])])
    );

    let expected_support: BTreeMap<String, usize> =
        [("1aaa", 2), ("2bbb", 1), ("3ccc", 1)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
    assert_eq!(pattern.total_support(), &expected_support);
}

#[test]
fn rediscovery_is_idempotent() {
    let hosts = mixed_hosts();
    let mut pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    let structural = pattern.structural_groups().clone();
    let sequence = pattern.sequence_groups().clone();
    let support = pattern.total_support().clone();

    pattern
        .find_protein_subgraphs(ClusteringOption::Structural)
        .unwrap();
    assert_eq!(pattern.structural_groups(), &structural);
    assert_eq!(pattern.sequence_groups(), &sequence);
    assert_eq!(pattern.total_support(), &support);
    assert_eq!(pattern.occurrence_count(), 4);
}

#[test]
fn sequential_and_parallel_scoring_agree() {
    let hosts = mixed_hosts();
    let parallel = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    let sequential = discover(
        yw_pattern(),
        &hosts,
        MiningConfig {
            parallel: false,
            ..MiningConfig::default()
        },
        ClusteringOption::Structural,
    );
    assert_eq!(parallel.structural_groups(), sequential.structural_groups());
    assert_eq!(parallel.sequence_groups(), sequential.sequence_groups());
}

#[test]
fn single_occurrence_forms_single_group() {
    let hosts = vec![host("1aaa", &[Contact::new(10, 20)])];
    let pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Sequence,
    );
    let expected = groups(vec![(1, vec!["1aaa_1"])]);
    assert_eq!(pattern.structural_groups(), &expected);
    assert_eq!(pattern.sequence_groups(), &expected);
}

#[test]
fn no_occurrences_leaves_single_empty_group() {
    let hosts = vec![host("1aaa", &[Contact::new(10, 20)])];
    let pattern = discover(
        ww_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    assert_eq!(pattern.occurrence_count(), 0);
    assert_eq!(pattern.groups(), &groups(vec![(1, vec![])]));
    assert_eq!(pattern.total_support()["1aaa"], 0);
    assert!(pattern.full_report().unwrap().contains(MISSING_RUN_MESSAGE));
}

#[test]
fn total_support_counts_embeddings_before_dedup() {
    let mut graph = ResidueGraph::new("");
    graph.add_node(ResidueNode::new("W1(A)", "W", common::TRP));
    graph.add_node(ResidueNode::new("W2(A)", "W", common::TRP));
    graph
        .add_edge("W1(A)", "W2(A)", ContactEdge::new(1).with_weight(1.0))
        .unwrap();
    let ww_host = Arc::new(
        HostStructure::new("4ddd", graph)
            .with_residue("W1(A)", Residue::new(1).with_atom("CA", [0.0; 3]))
            .with_residue("W2(A)", Residue::new(2).with_atom("CA", [3.8, 0.0, 0.0])),
    );

    let pattern = discover(
        ww_pattern(),
        &[ww_host],
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    // both orientations of the symmetric pattern are found, one survives
    assert_eq!(pattern.total_support()["4ddd"], 2);
    assert_eq!(pattern.occurrence_count(), 1);
}

#[test]
fn rmsd_is_symmetric() {
    let hosts = mixed_hosts();
    let pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    let support: Support = hosts.iter().map(|h| (h.id.clone(), h.clone())).collect();
    let evaluator = SimilarityEvaluator::new(&support);

    let occurrences = pattern.occurrences();
    for a in occurrences {
        for b in occurrences {
            let ab = evaluator.evaluate(a, b).unwrap();
            let ba = evaluator.evaluate(b, a).unwrap();
            assert_relative_eq!(ab.rmsd, ba.rmsd, epsilon = 1e-9);
            assert_eq!(ab.sequence_distance, ba.sequence_distance);
        }
    }
}

#[test]
fn structural_threshold_is_inclusive() {
    // C-alpha spacings 3.8 and 4.8 superimpose with RMSD 0.5
    let hosts = vec![
        host("1aaa", &[Contact::new(10, 20)]),
        host(
            "2bbb",
            &[Contact::new(10, 20).ca([0.0, 0.0, 0.0], [4.8, 0.0, 0.0])],
        ),
    ];
    let support: Support = hosts.iter().map(|h| (h.id.clone(), h.clone())).collect();
    let probe = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    let occ = probe.occurrences();
    let rmsd = SimilarityEvaluator::new(&support)
        .evaluate(&occ[0], &occ[1])
        .unwrap()
        .rmsd;
    assert_relative_eq!(rmsd, 0.5, epsilon = 1e-9);

    let at = discover(
        yw_pattern(),
        &hosts,
        MiningConfig {
            rmsd_threshold: rmsd,
            ..MiningConfig::default()
        },
        ClusteringOption::Structural,
    );
    assert_eq!(at.structural_groups().len(), 1);

    let below = discover(
        yw_pattern(),
        &hosts,
        MiningConfig {
            rmsd_threshold: rmsd - 1e-7,
            ..MiningConfig::default()
        },
        ClusteringOption::Structural,
    );
    assert_eq!(below.structural_groups().len(), 2);
}

#[test]
fn invalid_option_leaves_state_untouched() {
    let hosts = mixed_hosts();
    let mut pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Sequence,
    );
    let before = pattern.groups().clone();

    let err = pattern.set_clustering("both").unwrap_err();
    assert!(matches!(err, EmapError::InvalidOption(ref s) if s == "both"));
    assert_eq!(pattern.clustering(), ClusteringOption::Sequence);
    assert_eq!(pattern.groups(), &before);
}

#[test]
fn patterns_form_a_strict_total_order() {
    let hosts = mixed_hosts();
    let wide = SubgraphPattern::new(yw_pattern(), 0, hosts.iter().cloned());
    let ww = SubgraphPattern::new(ww_pattern(), 1, hosts[..1].iter().cloned());
    let yw = SubgraphPattern::new(yw_pattern(), 2, hosts[..1].iter().cloned());
    let yw_again = SubgraphPattern::new(yw_pattern(), 7, hosts[1..2].iter().cloned());

    assert!(ww < yw, "same support: canonical form decides");
    assert!(yw < wide, "support decides first");
    assert_eq!(yw.cmp(&yw_again), Ordering::Equal);
    assert_eq!(yw, yw_again);
    assert_ne!(ww, yw);

    let mut patterns = vec![yw, wide, ww];
    patterns.sort_by(|a, b| b.cmp(a));
    for (i, p) in patterns.iter_mut().enumerate() {
        p.update_index(i);
    }
    let ids: Vec<&str> = patterns.iter().map(|p| p.id()).collect();
    assert!(ids[0].starts_with("1_") && ids[0].ends_with("_3"));
    assert!(ids[1].starts_with("2_") && ids[1].ends_with("_1"));
    assert!(ids[2].starts_with("3_") && ids[2].ends_with("_1"));
    assert!(ids[1].contains('Y') && !ids[2].contains('Y'));
}

#[test]
fn viewer_metadata_serializes() {
    let hosts = mixed_hosts();
    let pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    let meta = pattern.viewer_metadata("1aaa_1").unwrap();
    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(json[0]["label_text"], "Y10(A)");
    assert_eq!(json[0]["color"], "blue");
    assert_eq!(json[0]["atom"], ".CA");
    assert_eq!(json[1]["color"], "red");
    assert_eq!(json[1]["selection"], "[TRP]20:A.*");
}

#[test]
fn dot_files_use_file_id() {
    let hosts = mixed_hosts();
    let pattern = discover(
        yw_pattern(),
        &hosts,
        MiningConfig::default(),
        ClusteringOption::Structural,
    );
    let drawable = pattern.drawable(Some("2bbb_2")).unwrap();
    assert_eq!(drawable.name, format!("{}_2bbb_2", pattern.file_id()));

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join(format!("{}.dot", drawable.name));
    pattern.write_dot(Some("2bbb_2"), Some(&dest)).unwrap();
    let dot = std::fs::read_to_string(&dest).unwrap();
    assert!(dot.contains("Y10(A)"));
    assert!(dot.contains("9.00"));
}
