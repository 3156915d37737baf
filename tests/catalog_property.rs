//! Plan-building invariants over arbitrary selections.

use mendrun::catalog::{build_plan, default_catalog, ChkdskMode, OperationClass, Selections};
use proptest::prelude::*;

fn arb_selections() -> impl Strategy<Value = Selections> {
    (
        any::<[bool; 10]>(),
        prop_oneof![Just(ChkdskMode::Scan), Just(ChkdskMode::Fix)],
        "[C-F]:",
    )
        .prop_map(|(toggles, chkdsk_mode, chkdsk_drive)| Selections {
            temp: toggles[0],
            prefetch: toggles[1],
            recycle_bin: toggles[2],
            flush_dns: toggles[3],
            component_cleanup: toggles[4],
            update_cache: toggles[5],
            dism_scan: toggles[6],
            dism_restore: toggles[7],
            sfc: toggles[8],
            chkdsk: toggles[9],
            chkdsk_mode,
            chkdsk_drive,
            reset_network: false,
        })
}

proptest! {
    /// Cleanup steps always precede repair steps, whatever is toggled.
    #[test]
    fn cleanup_always_precedes_repair(selections in arb_selections()) {
        let catalog = default_catalog();
        let class_of = |name: &str| {
            catalog
                .iter()
                .find(|e| (e.name)(&selections) == name)
                .map(|e| e.class)
        };

        let plan = build_plan(&selections);
        let mut seen_repair = false;
        for step in plan.steps() {
            match class_of(&step.name) {
                Some(OperationClass::Repair) => seen_repair = true,
                Some(OperationClass::Cleanup) => {
                    prop_assert!(!seen_repair, "cleanup step after a repair step");
                }
                None => prop_assert!(false, "step not found in catalog: {}", step.name),
            }
        }
    }

    /// The plan is exactly the enabled catalog entries, in catalog order
    /// within each class.
    #[test]
    fn plan_matches_enabled_entries(selections in arb_selections()) {
        let catalog = default_catalog();
        let mut expected = Vec::new();
        for class in [OperationClass::Cleanup, OperationClass::Repair] {
            for entry in catalog.iter().filter(|e| e.class == class) {
                if (entry.enabled)(&selections) {
                    expected.push((entry.name)(&selections));
                }
            }
        }

        let plan = build_plan(&selections);
        let actual: Vec<String> = plan.steps().iter().map(|s| s.name.clone()).collect();
        prop_assert_eq!(actual, expected);
    }
}
