//! Country name join keys
//!
//! Feature names from the world atlas and locations from the case table are
//! compared through a normalized `CountryKey`: trimmed, internal whitespace
//! collapsed, case-folded. Names that differ by more than that (e.g.
//! "United States of America" vs "United States") go through `JoinAliases`.

use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

fn whitespace() -> &'static Regex {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace regex"))
}

/// Normalized country name used as the join key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountryKey(String);

impl CountryKey {
    pub fn new(name: &str) -> Self {
        let collapsed = whitespace().replace_all(name.trim(), " ");
        Self(collapsed.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Blank names never join with anything
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CountryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Feature name → dataset location overrides
#[derive(Debug, Clone, PartialEq)]
pub struct JoinAliases {
    aliases: HashMap<CountryKey, String>,
}

/// Names in the 110m world atlas that differ from OWID locations
const WORLD_ATLAS_ALIASES: [(&str, &str); 13] = [
    ("United States of America", "United States"),
    ("Dem. Rep. Congo", "Democratic Republic of Congo"),
    ("Central African Rep.", "Central African Republic"),
    ("Bosnia and Herz.", "Bosnia and Herzegovina"),
    ("Dominican Rep.", "Dominican Republic"),
    ("S. Sudan", "South Sudan"),
    ("Eq. Guinea", "Equatorial Guinea"),
    ("Solomon Is.", "Solomon Islands"),
    ("Falkland Is.", "Falkland Islands"),
    ("Côte d'Ivoire", "Cote d'Ivoire"),
    ("Timor-Leste", "Timor"),
    ("W. Sahara", "Western Sahara"),
    ("Macedonia", "North Macedonia"),
];

impl Default for JoinAliases {
    fn default() -> Self {
        Self::world_atlas()
    }
}

impl JoinAliases {
    /// No aliases: every name joins on its normalized form only
    pub fn empty() -> Self {
        Self {
            aliases: HashMap::new(),
        }
    }

    /// Aliases for the 110m world atlas against OWID location names
    pub fn world_atlas() -> Self {
        let mut aliases = Self::empty();
        for (feature_name, location) in WORLD_ATLAS_ALIASES {
            aliases.insert(feature_name, location);
        }
        aliases
    }

    /// Build from configured pairs, on top of the world atlas defaults
    pub fn with_overrides<'a>(pairs: impl IntoIterator<Item = (&'a String, &'a String)>) -> Self {
        let mut aliases = Self::world_atlas();
        for (feature_name, location) in pairs {
            aliases.insert(feature_name, location);
        }
        aliases
    }

    pub fn insert(&mut self, feature_name: &str, location: &str) {
        self.aliases
            .insert(CountryKey::new(feature_name), location.to_string());
    }

    /// Dataset location to use for a feature name
    pub fn resolve<'a>(&'a self, feature_name: &'a str) -> &'a str {
        self.aliases
            .get(&CountryKey::new(feature_name))
            .map(String::as_str)
            .unwrap_or(feature_name)
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
