use std::collections::BTreeMap;
use std::fmt;

use super::{Error, MatchingConditions, Result};
use crate::interface::OperStatus;

pub type Labels = BTreeMap<String, String>;

/// Which attribute an item (or group member) is named after.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingScheme {
    #[default]
    Index,
    Descr,
    Alias,
}

impl NamingScheme {
    pub fn name(self) -> &'static str {
        match self {
            NamingScheme::Index => "index",
            NamingScheme::Descr => "descr",
            NamingScheme::Alias => "alias",
        }
    }
}

impl fmt::Display for NamingScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn default_true() -> bool {
    true
}

/// Settings for discovering single interfaces.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SingleDiscoveryRule {
    pub enabled: bool,
    #[serde(default)]
    pub naming: NamingScheme,
    #[serde(default = "default_true")]
    pub pad_portnumbers: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

impl Default for SingleDiscoveryRule {
    fn default() -> Self {
        Self {
            enabled: false,
            naming: NamingScheme::Index,
            pad_portnumbers: true,
            labels: Labels::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupItem {
    pub group_name: String,
    #[serde(default)]
    pub member_appearance: NamingScheme,
}

/// Settings for grouping interfaces. Disabled grouping excludes the matching interfaces
/// from the groups of lower priority rules.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupingRule {
    pub enabled: bool,
    #[serde(default)]
    pub group_items: Vec<GroupItem>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: Labels,
}

/// One entry of the prioritized discovery rule list. Earlier rules take precedence.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiscoveryRule {
    #[serde(default)]
    pub matching_conditions: MatchingConditions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovery_single: Option<SingleDiscoveryRule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grouping: Option<GroupingRule>,
}

const DEFAULT_PORT_TYPES: [&str; 12] = [
    "6", "32", "62", "117", "127", "128", "129", "180", "181", "182", "205", "229",
];

impl DiscoveryRule {
    /// The rule applied to hosts without any configuration: ethernet-like ports that are
    /// up, named by padded index.
    pub fn builtin_default() -> Self {
        Self {
            matching_conditions: MatchingConditions {
                porttypes: Some(DEFAULT_PORT_TYPES.iter().map(|t| t.to_string()).collect()),
                portstates: Some(vec![OperStatus::Up]),
                ..Default::default()
            },
            discovery_single: Some(SingleDiscoveryRule {
                enabled: true,
                ..Default::default()
            }),
            grouping: None,
        }
    }

    /// Checks invariants serde cannot express on its own.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyGroupName`] if a grouping rule names an empty group.
    pub fn validate(&self) -> Result<()> {
        if let Some(grouping) = &self.grouping {
            if grouping
                .group_items
                .iter()
                .any(|item| item.group_name.trim().is_empty())
            {
                return Err(Error::EmptyGroupName);
            }
        }
        Ok(())
    }
}
