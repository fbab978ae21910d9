use crate::Builtin;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuiltinCatalogEntry {
    pub material: Builtin,
    pub canonical_id: &'static str,
    pub display_name: &'static str,
    pub aliases: &'static [&'static str],
}

impl BuiltinCatalogEntry {
    /// Exact, case-insensitive match on the canonical id or any alias.
    pub fn matches_name(&self, name: &str) -> bool {
        let name = name.trim();
        self.canonical_id.eq_ignore_ascii_case(name)
            || self
                .aliases
                .iter()
                .any(|alias| alias.eq_ignore_ascii_case(name))
    }

    /// Substring search used by the CLI listing.
    pub fn matches_query(&self, query: &str) -> bool {
        let query = query.trim().to_ascii_lowercase();
        if query.is_empty() {
            return true;
        }

        self.canonical_id.to_ascii_lowercase().contains(&query)
            || self.display_name.to_ascii_lowercase().contains(&query)
            || self
                .aliases
                .iter()
                .any(|alias| alias.to_ascii_lowercase().contains(&query))
    }
}

const BUILTIN_CATALOG: [BuiltinCatalogEntry; 8] = [
    BuiltinCatalogEntry {
        material: Builtin::Sodium,
        canonical_id: "sodium",
        display_name: "Sodium",
        aliases: &["na"],
    },
    BuiltinCatalogEntry {
        material: Builtin::NaK,
        canonical_id: "nak",
        display_name: "NaK-78",
        aliases: &["nak78", "nak-78"],
    },
    BuiltinCatalogEntry {
        material: Builtin::Lead,
        canonical_id: "lead",
        display_name: "Lead",
        aliases: &["pb"],
    },
    BuiltinCatalogEntry {
        material: Builtin::LeadBismuth,
        canonical_id: "lbe",
        display_name: "Lead-bismuth eutectic",
        aliases: &["pb-bi", "pbbi", "lead-bismuth"],
    },
    BuiltinCatalogEntry {
        material: Builtin::Tin,
        canonical_id: "tin",
        display_name: "Tin",
        aliases: &["sn"],
    },
    BuiltinCatalogEntry {
        material: Builtin::Ht9,
        canonical_id: "ht9",
        display_name: "HT9 ferritic-martensitic steel",
        aliases: &["ht-9"],
    },
    BuiltinCatalogEntry {
        material: Builtin::Ss316,
        canonical_id: "ss316",
        display_name: "Stainless steel 316",
        aliases: &["316ss", "ss-316"],
    },
    BuiltinCatalogEntry {
        material: Builtin::UZr,
        canonical_id: "u10zr",
        display_name: "U-10Zr metallic fuel",
        aliases: &["uzr", "u-10zr", "u-zr"],
    },
];

pub fn builtin_catalog() -> &'static [BuiltinCatalogEntry] {
    &BUILTIN_CATALOG
}

pub fn filter_builtin_catalog(query: &str) -> Vec<BuiltinCatalogEntry> {
    BUILTIN_CATALOG
        .iter()
        .copied()
        .filter(|entry| entry.matches_query(query))
        .collect()
}

pub fn lookup_builtin(name: &str) -> Option<&'static BuiltinCatalogEntry> {
    BUILTIN_CATALOG.iter().find(|entry| entry.matches_name(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_covers_every_builtin() {
        for mat in Builtin::ALL {
            assert!(
                builtin_catalog().iter().any(|e| e.material == mat),
                "{mat:?} has no catalog entry"
            );
        }
    }

    #[test]
    fn lookup_is_case_insensitive_on_aliases() {
        assert_eq!(lookup_builtin("Na").map(|e| e.material), Some(Builtin::Sodium));
        assert_eq!(
            lookup_builtin("Pb-Bi").map(|e| e.material),
            Some(Builtin::LeadBismuth)
        );
        assert!(lookup_builtin("water").is_none());
    }

    #[test]
    fn query_filter_matches_display_names() {
        let hits = filter_builtin_catalog("steel");
        assert_eq!(hits.len(), 2);
        assert_eq!(filter_builtin_catalog("").len(), builtin_catalog().len());
    }
}
