//! Site registry for looking up descriptors.

use jobscrape_core::SiteKind;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::agrilabour::agrilabour_descriptor;
use crate::apgworkforce::apgworkforce_descriptor;
use crate::costagroup::costagroup_descriptor;
use crate::descriptor::SiteDescriptor;
use crate::workforceaustralia::workforceaustralia_descriptor;

// ============================================================================
// Static Registry
// ============================================================================

static DESCRIPTORS: OnceLock<Vec<SiteDescriptor>> = OnceLock::new();

static CLI_NAME_MAP: OnceLock<HashMap<String, SiteKind>> = OnceLock::new();

fn init_descriptors() -> Vec<SiteDescriptor> {
    vec![
        agrilabour_descriptor(),
        apgworkforce_descriptor(),
        costagroup_descriptor(),
        workforceaustralia_descriptor(),
    ]
}

fn build_cli_name_map(descriptors: &[SiteDescriptor]) -> HashMap<String, SiteKind> {
    let mut map = HashMap::new();

    for desc in descriptors {
        map.insert(desc.cli_name().to_string(), desc.id);
        for alias in desc.aliases {
            map.insert((*alias).to_string(), desc.id);
        }
    }

    map
}

// ============================================================================
// Site Registry
// ============================================================================

/// Registry of all site descriptors, initialized on first access.
pub struct SiteRegistry;

impl SiteRegistry {
    /// Returns all site descriptors.
    pub fn all() -> &'static [SiteDescriptor] {
        DESCRIPTORS.get_or_init(init_descriptors)
    }

    /// Gets a descriptor by kind.
    pub fn get(id: SiteKind) -> Option<&'static SiteDescriptor> {
        Self::all().iter().find(|d| d.id == id)
    }

    /// Returns the CLI name and alias mapping.
    pub fn cli_name_map() -> &'static HashMap<String, SiteKind> {
        CLI_NAME_MAP.get_or_init(|| build_cli_name_map(Self::all()))
    }

    /// Looks up a site by CLI name or alias, case-insensitively.
    pub fn get_by_cli_name(name: &str) -> Option<&'static SiteDescriptor> {
        let kind = Self::cli_name_map().get(&name.trim().to_ascii_lowercase())?;
        Self::get(*kind)
    }

    /// Returns the number of registered sites.
    pub fn count() -> usize {
        Self::all().len()
    }

    /// Returns all site kinds.
    pub fn kinds() -> Vec<SiteKind> {
        Self::all().iter().map(|d| d.id).collect()
    }
}
