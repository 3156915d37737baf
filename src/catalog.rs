//! The default operation catalog and plan building.
//!
//! Catalog entries are data: a class, a display name, an enablement
//! predicate over [`Selections`], and a builder producing the concrete
//! [`Operation`]. Plans always order cleanup-class steps before repair-class
//! steps, in catalog declaration order, regardless of how the user toggled
//! the selections.

use crate::operation::Operation;
use crate::plan::{RunPlan, Step};
use crate::routines::{NetworkReset, SweepDirs, UpdateCacheRepair};

/// Whether a catalog entry reclaims space or repairs system state. Cleanup
/// runs first so repairs work on an already-lightened system.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum OperationClass {
    Cleanup,
    Repair,
}

/// Mode for the disk check step.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ChkdskMode {
    /// Read-only scan of the file system.
    #[default]
    Scan,
    /// Repair mode; the platform may schedule it for the next boot.
    Fix,
}

/// User-facing toggles deciding which catalog entries join the plan.
#[derive(Clone, Debug)]
pub struct Selections {
    pub temp: bool,
    pub prefetch: bool,
    pub recycle_bin: bool,
    pub flush_dns: bool,
    pub component_cleanup: bool,
    pub update_cache: bool,
    pub dism_scan: bool,
    pub dism_restore: bool,
    pub sfc: bool,
    pub chkdsk: bool,
    pub chkdsk_mode: ChkdskMode,
    pub chkdsk_drive: String,
    pub reset_network: bool,
}

impl Default for Selections {
    /// The safe everyday preset: temp sweep, recycle bin, image repair, and
    /// system file repair on; everything invasive off.
    fn default() -> Self {
        Self {
            temp: true,
            prefetch: false,
            recycle_bin: true,
            flush_dns: false,
            component_cleanup: false,
            update_cache: false,
            dism_scan: false,
            dism_restore: true,
            sfc: true,
            chkdsk: false,
            chkdsk_mode: ChkdskMode::Scan,
            chkdsk_drive: "C:".to_string(),
            reset_network: false,
        }
    }
}

impl Selections {
    /// A selection with every toggle off, for building plans entry by entry.
    pub fn none() -> Self {
        Self {
            temp: false,
            recycle_bin: false,
            dism_restore: false,
            sfc: false,
            ..Self::default()
        }
    }
}

/// One row of the catalog.
pub struct CatalogEntry {
    pub class: OperationClass,
    pub name: fn(&Selections) -> String,
    pub enabled: fn(&Selections) -> bool,
    pub build: fn(&Selections) -> Operation,
}

/// The built-in maintenance catalog, in declaration order within each class.
pub fn default_catalog() -> Vec<CatalogEntry> {
    vec![
        CatalogEntry {
            class: OperationClass::Cleanup,
            name: |_| "Cleanup (Temp/Prefetch)".to_string(),
            enabled: |s| s.temp || s.prefetch,
            build: |s| Operation::routine(SweepDirs::temp_sweep(s.prefetch)),
        },
        CatalogEntry {
            class: OperationClass::Cleanup,
            name: |_| "Empty Recycle Bin".to_string(),
            enabled: |s| s.recycle_bin,
            build: |_| {
                Operation::command([
                    "powershell",
                    "-NoProfile",
                    "-Command",
                    "Clear-RecycleBin -Force -ErrorAction SilentlyContinue",
                ])
            },
        },
        CatalogEntry {
            class: OperationClass::Cleanup,
            name: |_| "Flush DNS Cache".to_string(),
            enabled: |s| s.flush_dns,
            build: |_| Operation::command(["ipconfig", "/flushdns"]),
        },
        CatalogEntry {
            class: OperationClass::Cleanup,
            name: |_| "DISM Component Cleanup".to_string(),
            enabled: |s| s.component_cleanup,
            build: |_| {
                Operation::command(["DISM", "/Online", "/Cleanup-Image", "/StartComponentCleanup"])
            },
        },
        CatalogEntry {
            class: OperationClass::Cleanup,
            name: |_| "Clear Windows Update Cache".to_string(),
            enabled: |s| s.update_cache,
            build: |_| Operation::routine(UpdateCacheRepair::from_env()),
        },
        CatalogEntry {
            class: OperationClass::Repair,
            name: |_| "DISM ScanHealth".to_string(),
            enabled: |s| s.dism_scan,
            build: |_| Operation::command(["DISM", "/Online", "/Cleanup-Image", "/ScanHealth"]),
        },
        CatalogEntry {
            class: OperationClass::Repair,
            name: |_| "DISM RestoreHealth".to_string(),
            enabled: |s| s.dism_restore,
            build: |_| Operation::command(["DISM", "/Online", "/Cleanup-Image", "/RestoreHealth"]),
        },
        CatalogEntry {
            class: OperationClass::Repair,
            name: |_| "SFC ScanNow".to_string(),
            enabled: |s| s.sfc,
            build: |_| Operation::command(["sfc", "/scannow"]),
        },
        CatalogEntry {
            class: OperationClass::Repair,
            name: |s| {
                let mode = match s.chkdsk_mode {
                    ChkdskMode::Scan => "scan",
                    ChkdskMode::Fix => "fix",
                };
                format!("CHKDSK ({}, {mode})", s.chkdsk_drive.to_uppercase())
            },
            enabled: |s| s.chkdsk,
            build: |s| {
                let drive = s.chkdsk_drive.trim().to_uppercase();
                match s.chkdsk_mode {
                    ChkdskMode::Scan => Operation::command(["chkdsk".to_string(), drive]),
                    ChkdskMode::Fix => Operation::command([
                        "cmd".to_string(),
                        "/c".to_string(),
                        format!("chkdsk {drive} /f"),
                    ]),
                }
            },
        },
        CatalogEntry {
            class: OperationClass::Repair,
            name: |_| "Reset Network Stack".to_string(),
            enabled: |s| s.reset_network,
            build: |_| Operation::routine(NetworkReset),
        },
    ]
}

/// Builds the run plan for `selections`: enabled cleanup entries first, then
/// enabled repair entries, each class in declaration order.
pub fn build_plan(selections: &Selections) -> RunPlan {
    let catalog = default_catalog();
    let mut steps = Vec::new();
    for class in [OperationClass::Cleanup, OperationClass::Repair] {
        for entry in catalog.iter().filter(|e| e.class == class) {
            if (entry.enabled)(selections) {
                steps.push(Step::new((entry.name)(selections), (entry.build)(selections)));
            }
        }
    }
    RunPlan::new(steps)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_selection_orders_cleanup_before_repair() {
        let plan = build_plan(&Selections::default());
        let names: Vec<&str> = plan.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Cleanup (Temp/Prefetch)",
                "Empty Recycle Bin",
                "DISM RestoreHealth",
                "SFC ScanNow",
            ]
        );
    }

    #[test]
    fn empty_selection_builds_empty_plan() {
        let plan = build_plan(&Selections::none());
        assert!(plan.is_empty());
    }

    #[test]
    fn chkdsk_name_includes_drive_and_mode() {
        let selections = Selections {
            chkdsk: true,
            chkdsk_drive: "d:".to_string(),
            chkdsk_mode: ChkdskMode::Fix,
            ..Selections::none()
        };
        let plan = build_plan(&selections);
        assert_eq!(plan.steps()[0].name, "CHKDSK (D:, fix)");
    }

    #[test]
    fn selection_order_does_not_matter() {
        // Repair entries come after cleanup entries no matter which toggles
        // are set.
        let selections = Selections {
            sfc: true,
            flush_dns: true,
            ..Selections::none()
        };
        let plan = build_plan(&selections);
        let names: Vec<&str> = plan.steps().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Flush DNS Cache", "SFC ScanNow"]);
    }
}
