//! # Differential Harness Tiers (T0-T4)
//!
//! Every tier drives a real pair of backends. If ANY tier fails, the harness
//! cannot be trusted to surface divergence.
//!
//! ## Tiers
//! - T0: Construction Invariant
//! - T1: Forwarded Mutations
//! - T2: Search Reconciliation
//! - T3: Attribute Divergence
//! - T4: Deletion and Save State

use dualparse_core::{
    ArenaBlock, ArenaDirective, BlockNode, DirectiveNode, DirectiveParams, DualBlock,
    DualDirective, DualError, DualNode, Found, KeyedBlock, KeyedDirective, MatchPolicy, Observed,
    PassBlock, nodes_equivalent,
};
use std::path::PathBuf;

type Harness = DualBlock<ArenaBlock, KeyedBlock>;

const CONF: &str = "/etc/apache2/apache2.conf";

fn harness() -> Harness {
    Harness::new(&DirectiveParams::new("root").with_filepath(CONF)).expect("root")
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Parameters of a raw backend search, in the backend's own order.
fn raw_parameters<D: DirectiveNode, E: std::fmt::Debug>(
    found: Result<Vec<Found<D>>, E>,
) -> Vec<Observed<Vec<String>>> {
    found
        .expect("raw search")
        .iter()
        .map(|d| d.as_node().expect("node").parameters())
        .collect()
}

// =============================================================================
// TIER T0: CONSTRUCTION INVARIANT
// =============================================================================

mod t0_construction {
    use super::*;

    /// T0.1: A fresh dual block wraps equivalent nodes.
    #[test]
    fn fresh_block_is_equivalent() {
        let root = harness();
        assert!(nodes_equivalent(root.primary(), root.secondary()));
        assert_eq!(root.name().expect("name"), Observed::Value("root".to_string()));
    }

    /// T0.2: Every created child is equivalent on both sides.
    #[test]
    fn created_children_are_equivalent() {
        let mut root = harness();
        let mut vhost = root
            .add_child_block("VirtualHost", ["*:80"], None)
            .expect("block");
        let name = vhost
            .add_child_directive("ServerName", ["example.org"], None)
            .expect("directive");
        let comment = vhost.add_child_comment("managed", Some(0)).expect("comment");

        assert!(nodes_equivalent(vhost.primary(), vhost.secondary()));
        assert!(nodes_equivalent(name.primary(), name.secondary()));
        assert!(nodes_equivalent(comment.primary(), comment.secondary()));
        assert_eq!(comment.comment().expect("read"), Observed::Value("managed".to_string()));
    }

    /// T0.3: Wrapping diverging nodes is rejected.
    #[test]
    fn from_pair_rejects_diverging_nodes() {
        let primary = ArenaDirective::create(&DirectiveParams::new("Listen").with_parameters(["80"]))
            .expect("create");
        let secondary =
            KeyedDirective::create(&DirectiveParams::new("Listen").with_parameters(["443"]))
                .expect("create");

        let result = DualDirective::from_pair(Found::Node(primary), Found::Node(secondary));
        assert!(matches!(result, Err(DualError::Equivalence { .. })));
    }

    /// T0.4: Child creation failures name the failing side.
    #[test]
    fn invalid_position_reports_backend_error() {
        let mut root = harness();
        let err = root
            .add_child_comment("late", Some(5))
            .expect_err("position past end");
        assert!(!err.is_divergence());
        assert!(err.to_string().starts_with("primary"));
    }
}

// =============================================================================
// TIER T1: FORWARDED MUTATIONS
// =============================================================================

mod t1_mutations {
    use super::*;

    /// T1.1: set_parameters updates both sides and reads back without error.
    #[test]
    fn set_parameters_reads_back() {
        let mut root = harness();
        let mut listen = root.add_child_directive("Listen", ["80"], None).expect("add");

        listen.set_parameters(["a", "b"]).expect("set");

        assert_eq!(listen.parameters().expect("read"), Observed::Value(strings(&["a", "b"])));
        assert!(nodes_equivalent(listen.primary(), listen.secondary()));
    }

    /// T1.2: Block parameters are mutable too.
    #[test]
    fn block_set_parameters() {
        let mut root = harness();
        let mut vhost = root.add_child_block("VirtualHost", ["*:80"], None).expect("add");

        vhost.set_parameters(["*:443"]).expect("set");

        assert_eq!(vhost.parameters().expect("read"), Observed::Value(strings(&["*:443"])));
    }

    /// T1.3: Child blocks inherit the parent's match policy.
    #[test]
    fn policy_is_inherited() {
        let mut root = harness().with_policy(MatchPolicy::Exclusive);
        let vhost = root.add_child_block("VirtualHost", ["*:80"], None).expect("add");
        assert_eq!(vhost.policy(), MatchPolicy::Exclusive);

        let found = root.find_blocks("VirtualHost", true).expect("find");
        assert!(found.iter().all(|block| block.policy() == MatchPolicy::Exclusive));
    }
}

// =============================================================================
// TIER T2: SEARCH RECONCILIATION
// =============================================================================

mod t2_reconciliation {
    use super::*;

    /// T2.1: Three distinguishable results pair up in matching order.
    #[test]
    fn three_results_pair_in_order() {
        let mut root = harness();
        let mut outer = root.add_child_block("IfModule", ["ssl"], None).expect("add");
        root.add_child_directive("ServerName", ["a.example"], None).expect("add");
        outer.add_child_directive("ServerName", ["b.example"], None).expect("add");
        root.add_child_directive("ServerName", ["c.example"], None).expect("add");

        let found = root.find_directives("ServerName", true).expect("find");

        assert_eq!(found.len(), 3);
        for directive in &found {
            assert!(nodes_equivalent(directive.primary(), directive.secondary()));
        }

        // Arena walks the document, keyed walks creation order: only the primary's order survives.
        let primary = root.primary().as_node().expect("primary");
        let secondary = root.secondary().as_node().expect("secondary");
        let dual_order: Vec<_> = found
            .iter()
            .map(|d| d.parameters().expect("read"))
            .collect();
        let primary_order = raw_parameters(primary.find_directives("ServerName", true));
        let secondary_order = raw_parameters(secondary.find_directives("ServerName", true));

        assert_eq!(dual_order, primary_order);
        assert_eq!(
            dual_order,
            ["b.example", "a.example", "c.example"].map(|host| Observed::Value(strings(&[host])))
        );
        assert_ne!(dual_order, secondary_order);
    }

    /// T2.2: A passing primary is broadcast against every secondary result.
    #[test]
    fn sentinel_broadcast() {
        let mut root: DualBlock<PassBlock, KeyedBlock> =
            DualBlock::new(&DirectiveParams::new("root")).expect("root");
        for port in ["80", "443", "8080", "8443"] {
            root.add_child_directive("Listen", [port], None).expect("add");
        }

        let found = root.find_directives("Listen", true).expect("find");

        assert_eq!(found.len(), 4);
        assert!(found.iter().all(|d| d.primary().is_pass()));
        assert!(found.iter().all(|d| !d.secondary().is_pass()));
        assert_eq!(found[0].parameters().expect("read"), Observed::Value(strings(&["80"])));
    }

    /// T2.2b: The broadcast follows the secondary's own result order.
    #[test]
    fn sentinel_broadcast_keeps_secondary_order() {
        let mut root: DualBlock<PassBlock, ArenaBlock> =
            DualBlock::new(&DirectiveParams::new("root")).expect("root");
        for port in ["80", "443", "8080"] {
            root.add_child_directive("Listen", [port], Some(0)).expect("add");
        }

        let found = root.find_directives("Listen", true).expect("find");

        let secondary = root.secondary().as_node().expect("secondary");
        let dual_order: Vec<_> = found
            .iter()
            .map(|d| d.parameters().expect("read"))
            .collect();
        assert_eq!(dual_order, raw_parameters(secondary.find_directives("Listen", true)));
        assert_eq!(
            dual_order,
            ["8080", "443", "80"].map(|port| Observed::Value(strings(&[port])))
        );
    }

    /// T2.3: Two passing backends produce a single sentinel pair.
    #[test]
    fn both_pass_produce_one_pair() {
        let root: DualBlock<PassBlock, PassBlock> =
            DualBlock::new(&DirectiveParams::new("root")).expect("root");

        let found = root.find_comments("anything", false).expect("find");

        assert_eq!(found.len(), 1);
        assert!(found[0].primary().is_pass() && found[0].secondary().is_pass());
        assert_eq!(found[0].comment().expect("read"), Observed::Pass);
    }

    /// T2.4: Unequal result counts are fatal.
    #[test]
    fn length_mismatch() {
        let mut root = harness();
        root.add_child_directive("Listen", ["80"], None).expect("add");
        root.add_child_directive("Listen", ["443"], None).expect("add");

        let mut raw = root.secondary().as_node().cloned().expect("secondary");
        raw.add_child_directive("Listen", &strings(&["8080"]), None)
            .expect("raw add");

        let err = root.find_directives("Listen", true).expect_err("mismatch");
        assert!(matches!(
            err,
            DualError::LengthMismatch {
                operation: "find_directives",
                primary: 2,
                secondary: 3
            }
        ));
    }

    /// T2.5: A primary result without counterpart is fatal.
    #[test]
    fn no_match() {
        let mut root = harness();
        root.add_child_directive("Listen", ["80"], None).expect("add");
        let https = root.add_child_directive("Listen", ["443"], None).expect("add");

        let mut raw = https.secondary().as_node().cloned().expect("secondary");
        raw.set_parameters(&strings(&["8443"])).expect("raw set");

        let err = root.find_directives("Listen", true).expect_err("no match");
        assert!(matches!(err, DualError::NoMatch { operation: "find_directives", .. }));
    }

    /// T2.6: Exclusive pairing still accepts identical duplicates on both sides.
    #[test]
    fn exclusive_pairs_duplicates_one_to_one() {
        let mut root = harness().with_policy(MatchPolicy::Exclusive);
        root.add_child_comment("same", None).expect("add");
        root.add_child_comment("same", None).expect("add");

        let found = root.find_comments("same", true).expect("find");
        assert_eq!(found.len(), 2);
    }
}

// =============================================================================
// TIER T3: ATTRIBUTE DIVERGENCE
// =============================================================================

mod t3_divergence {
    use super::*;

    /// T3.1: A field changed behind the harness fails on proxied read.
    #[test]
    fn diverged_parameters_fail_on_read() {
        let mut root = harness();
        let listen = root.add_child_directive("Listen", ["80"], None).expect("add");

        let mut raw = listen.primary().as_node().cloned().expect("primary");
        raw.set_parameters(&strings(&["81"])).expect("raw set");

        let err = listen.parameters().expect_err("diverged");
        match err {
            DualError::Equivalence { context, .. } => assert_eq!(context, "parameters"),
            other => unreachable!("unexpected error: {other}"),
        }
        // name still agrees
        assert!(listen.name().is_ok());
    }

    /// T3.2: enabled is not part of node equivalence but is checked on read.
    #[test]
    fn diverged_enabled_fails_on_read() {
        let primary = ArenaDirective::create(&DirectiveParams::new("Include")).expect("create");
        let secondary =
            KeyedDirective::create(&DirectiveParams::new("Include").with_enabled(false))
                .expect("create");

        let include =
            DualDirective::from_pair(Found::Node(primary), Found::Node(secondary)).expect("wrap");

        assert!(matches!(include.enabled(), Err(DualError::Equivalence { .. })));
    }

    /// T3.3: A pass side never causes divergence.
    #[test]
    fn pass_side_reads_other_value() {
        let primary = ArenaDirective::create(&DirectiveParams::new("Include")).expect("create");
        let include: DualDirective<ArenaDirective, KeyedDirective> =
            DualDirective::from_pair(Found::Node(primary), Found::Pass).expect("wrap");

        assert_eq!(include.name().expect("read"), Observed::Value("Include".to_string()));
        assert_eq!(include.filepath().expect("read"), Observed::Value(None));
    }
}

// =============================================================================
// TIER T4: DELETION AND SAVE STATE
// =============================================================================

mod t4_deletion_and_save {
    use super::*;

    /// T4.1: delete_child removes the child from both backends.
    #[test]
    fn delete_found_child() {
        let mut root = harness();
        root.add_child_block("VirtualHost", ["*:80"], None).expect("add");
        root.add_child_block("VirtualHost", ["*:443"], None).expect("add");

        let mut found = root.find_blocks("VirtualHost", true).expect("find");
        let doomed = found.remove(0);
        root.delete_child(doomed).expect("delete");

        let left = root.find_blocks("VirtualHost", true).expect("find");
        assert_eq!(left.len(), 1);
    }

    /// T4.2: Deleting a comment and a directive works through the same call.
    #[test]
    fn delete_any_variant() {
        let mut root = harness();
        let comment = root.add_child_comment("gone", None).expect("add");
        let directive = root.add_child_directive("Listen", ["80"], None).expect("add");

        root.delete_child(comment).expect("delete comment");
        root.delete_child(directive).expect("delete directive");

        assert!(root.find_comments("gone", true).expect("find").is_empty());
        assert!(root.find_directives("Listen", false).expect("find").is_empty());
    }

    /// T4.3: Unsaved files agree until save clears them.
    #[test]
    fn unsaved_files_track_mutations() {
        let mut root = harness();
        assert!(root.unsaved_files().expect("unsaved").is_empty());

        root.add_child_directive("Listen", ["80"], None).expect("add");
        assert_eq!(root.unsaved_files().expect("unsaved"), vec![PathBuf::from(CONF)]);
        assert_eq!(root.dirty().expect("dirty"), Observed::Value(true));

        root.save("add listen").expect("save");
        assert!(root.unsaved_files().expect("unsaved").is_empty());

        let primary = root.primary().as_node().expect("primary");
        primary.with_document(|doc| assert_eq!(doc.save_log(), ["add listen".to_string()]));
    }

    /// T4.4: Diverging unsaved lists fail the strict comparison.
    #[test]
    fn unsaved_files_divergence() {
        let root = harness();
        let mut raw = root.secondary().as_node().cloned().expect("secondary");
        raw.add_child_comment("sneaky", None).expect("raw add");

        assert!(matches!(
            root.unsaved_files(),
            Err(DualError::Equivalence { .. })
        ));
    }

    /// T4.5: A pass backend contributes nothing to the unsaved list.
    #[test]
    fn unsaved_files_with_pass_backend() {
        let mut root: DualBlock<PassBlock, ArenaBlock> =
            DualBlock::new(&DirectiveParams::new("root").with_filepath(CONF)).expect("root");
        root.add_child_comment("hello", None).expect("add");

        assert_eq!(root.unsaved_files().expect("unsaved"), vec![PathBuf::from(CONF)]);

        let both: DualBlock<PassBlock, PassBlock> =
            DualBlock::new(&DirectiveParams::new("root")).expect("root");
        assert!(both.unsaved_files().expect("unsaved").is_empty());
    }
}
