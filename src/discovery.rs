//! Decides which interfaces and groups become monitored items.
//!
//! Rules are evaluated in priority order (first rule first). Every interface is named
//! by the first rule that matches it and carries single interface settings; groups are
//! collected from the data source tags and from the grouping rules. Item names that
//! would be produced more than once are disambiguated with the interface index.
use std::collections::{HashMap, HashSet};

use crate::config::{
    self, DiscoveredParams, DiscoveryRule, Labels, MatchingConditions, NamingScheme,
    SingleDiscoveryRule,
};
use crate::group::{self, GroupConfiguration};
use crate::interface::Interface;

pub mod naming;

/// Index used for disambiguating group items.
const GROUP_INDEX: &str = "1";

/// A service to be monitored.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiscoveredItem {
    pub item: String,
    pub parameters: DiscoveredParams,
    #[serde(default, skip_serializing_if = "Labels::is_empty")]
    pub labels: Labels,
}

struct Candidate {
    item: String,
    parameters: DiscoveredParams,
    index: String,
    index_as_item: bool,
    labels: Labels,
}

/// Groups in order of first declaration. Redeclaring a group replaces its configuration
/// but keeps its position.
#[derive(Default)]
struct GroupMap(Vec<(String, GroupConfiguration, Labels)>);

impl GroupMap {
    fn insert(&mut self, name: &str, config: GroupConfiguration, labels: Labels) {
        match self.0.iter_mut().find(|(existing, ..)| existing == name) {
            Some(entry) => {
                entry.1 = config;
                entry.2 = labels;
            }
            None => self.0.push((name.to_owned(), config, labels)),
        }
    }

    fn insert_if_absent(&mut self, name: &str, config: GroupConfiguration) {
        if !self.0.iter().any(|(existing, ..)| existing == name) {
            self.0.push((name.to_owned(), config, Labels::new()));
        }
    }

    fn extend(&mut self, other: GroupMap) {
        for (name, config, labels) in other.0 {
            self.insert(&name, config, labels);
        }
    }
}

/// Discovers items from a prioritized rule list.
///
/// # Example
/// ```
/// use ifmon::config::DiscoveryRule;
/// use ifmon::discovery::Discoverer;
/// use ifmon::interface::{Attributes, Counters, Interface, OperStatus};
///
/// let discoverer = Discoverer::new(vec![DiscoveryRule::builtin_default()]).unwrap();
/// let eth0 = Attributes::new("2", "eth0", "eth0", OperStatus::Up)
///     .unwrap()
///     .with_port_type("6");
/// let items = discoverer.discover(&[Interface::with_counters(eth0, Counters::default())]);
/// assert_eq!(items[0].item, "2");
/// ```
#[derive(Debug, Clone)]
pub struct Discoverer {
    rules: Vec<DiscoveryRule>,
}

impl Discoverer {
    /// # Errors
    ///
    /// Returns a [`config::Error`] if a rule is malformed.
    pub fn new(rules: Vec<DiscoveryRule>) -> config::Result<Self> {
        for rule in &rules {
            rule.validate()?;
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[DiscoveryRule] {
        &self.rules
    }

    pub fn discover(&self, section: &[Interface]) -> Vec<DiscoveredItem> {
        if section.is_empty() {
            return Vec::new();
        }
        let pad_width = naming::pad_width(section.iter().map(|iface| &iface.attributes));
        let fallback = SingleDiscoveryRule::default();

        let mut candidates = Vec::new();
        let mut seen_indices = HashSet::new();
        let mut times_seen: HashMap<String, usize> = HashMap::new();
        let mut groups = GroupMap::default();

        for iface in section {
            let attributes = &iface.attributes;
            let settings = self
                .rules
                .iter()
                .find_map(|rule| {
                    rule.discovery_single
                        .as_ref()
                        .filter(|_| rule.matching_conditions.matches(attributes))
                })
                .unwrap_or(&fallback);
            let width = settings.pad_portnumbers.then_some(pad_width).flatten();

            // Count every way of naming this interface, monitored or not.
            let mut appearances = vec![NamingScheme::Index, NamingScheme::Descr];
            if attributes.descr != attributes.alias {
                appearances.push(NamingScheme::Alias);
            }
            for appearance in appearances {
                *times_seen
                    .entry(naming::compute_item(appearance, attributes, width).item)
                    .or_default() += 1;
            }

            let item_info = naming::compute_item(settings.naming, attributes, width);
            if settings.enabled && seen_indices.insert(attributes.index.clone()) {
                log::debug!(
                    target: "discovery",
                    "discovered interface {} as item {:?}",
                    attributes.index,
                    item_info.item
                );
                let index_as_item = match (
                    item_info.item.parse::<u64>(),
                    attributes.index.parse::<u64>(),
                ) {
                    (Ok(item), Ok(index)) => item == index,
                    _ => false,
                };
                candidates.push(Candidate {
                    parameters: DiscoveredParams {
                        item_appearance: Some(item_info.used_appearance),
                        discovered_oper_status: Some(vec![attributes.oper_status.clone()]),
                        discovered_speed: Some(attributes.speed),
                        discovered_admin_status: attributes
                            .admin_status
                            .as_ref()
                            .map(|admin| vec![admin.clone()]),
                        aggregate: None,
                    },
                    item: item_info.item,
                    index: attributes.index.clone(),
                    index_as_item,
                    labels: settings.labels.clone(),
                });
            } else {
                log::trace!(
                    target: "discovery",
                    "not discovering interface {}",
                    attributes.index
                );
            }

            if let Some(group_name) = attributes.group.as_deref().filter(|g| !g.is_empty()) {
                groups.insert_if_absent(
                    group_name,
                    GroupConfiguration::from_data_source(settings.naming),
                );
            }
        }

        groups.extend(self.groups_from_rules());
        for (group_name, config, labels) in groups.0 {
            let members: Vec<_> = group::members(&group_name, &config, section)
                .map(|iface| &iface.attributes)
                .collect();
            if members.is_empty() {
                log::debug!(target: "discovery", "skipping empty group {group_name:?}");
                continue;
            }
            log::debug!(
                target: "discovery",
                "discovered group {group_name:?} with {} members",
                members.len()
            );
            candidates.push(Candidate {
                parameters: DiscoveredParams {
                    discovered_oper_status: Some(vec![group::group_oper_status(
                        members.iter().copied(),
                    )]),
                    discovered_speed: Some(group::group_speed(members.iter().copied())),
                    aggregate: Some(config),
                    ..Default::default()
                },
                item: group_name,
                index: GROUP_INDEX.to_owned(),
                index_as_item: false,
                labels,
            });
        }

        candidates
            .into_iter()
            .map(|candidate| {
                let duplicate = times_seen.get(&candidate.item).copied().unwrap_or(0) > 1;
                let item = if duplicate && !candidate.index_as_item {
                    format!("{} {}", candidate.item, display_index(&candidate.index))
                } else {
                    candidate.item
                };
                DiscoveredItem {
                    item,
                    parameters: candidate.parameters,
                    labels: candidate.labels,
                }
            })
            .collect()
    }

    /// Groups declared by rules with grouping enabled.
    ///
    /// For a group declared by several rules the highest priority rule wins. Its
    /// exclusions are the conditions of the rules ranked above it that disable grouping.
    fn groups_from_rules(&self) -> GroupMap {
        let mut groups = GroupMap::default();
        let mut importances: HashMap<String, usize> = HashMap::new();
        let mut exclusions: Vec<(&MatchingConditions, usize)> = Vec::new();

        for (importance, rule) in self.rules.iter().rev().enumerate() {
            let Some(grouping) = &rule.grouping else {
                continue;
            };
            if !grouping.enabled {
                exclusions.push((&rule.matching_conditions, importance));
                continue;
            }
            for group_item in &grouping.group_items {
                groups.insert(
                    &group_item.group_name,
                    GroupConfiguration {
                        member_appearance: group_item.member_appearance,
                        inclusion_condition: Some(rule.matching_conditions.clone()),
                        exclusion_conditions: Vec::new(),
                    },
                    grouping.labels.clone(),
                );
                importances.insert(group_item.group_name.clone(), importance);
            }
        }

        for (name, config, _) in &mut groups.0 {
            let inclusion_importance = importances.get(name).copied().unwrap_or(0);
            config.exclusion_conditions = exclusions
                .iter()
                .filter(|(_, importance)| *importance > inclusion_importance)
                .map(|(conditions, _)| (*conditions).clone())
                .collect();
        }
        groups
    }
}

// Numeric indices are shown without leading zeros.
fn display_index(index: &str) -> String {
    index
        .parse::<u64>()
        .map_or_else(|_| index.to_owned(), |index| index.to_string())
}
