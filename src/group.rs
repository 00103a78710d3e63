//! Interface groups (port channels, bonds, ...) checked as one item.
//!
//! A group is either declared by the data source through [`Attributes::group`] or by a
//! discovery rule with grouping enabled. Its members are combined into one synthetic
//! interface whose speed and queue length only count the members that are up.
use std::collections::BTreeSet;
use std::fmt;

use crate::config::{MatchingConditions, NamingScheme};
use crate::discovery::naming;
use crate::interface::{Attributes, Interface, OperStatus, PhysAddress, Traffic};
use crate::rates::{InterfaceWithRates, RatesWithAverages};

/// How the members of a group are selected and listed.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct GroupConfiguration {
    #[serde(default)]
    pub member_appearance: NamingScheme,
    /// Absent for groups declared by the data source; those match by group tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_condition: Option<MatchingConditions>,
    /// Conditions of higher priority rules that disable grouping.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub exclusion_conditions: Vec<MatchingConditions>,
}

impl GroupConfiguration {
    /// A group declared by the data source.
    pub fn from_data_source(member_appearance: NamingScheme) -> Self {
        Self {
            member_appearance,
            inclusion_condition: None,
            exclusion_conditions: Vec::new(),
        }
    }

    pub fn is_member(&self, group_name: &str, attributes: &Attributes) -> bool {
        match &self.inclusion_condition {
            None => attributes.group.as_deref() == Some(group_name),
            Some(inclusion) => {
                inclusion.matches(attributes)
                    && !self
                        .exclusion_conditions
                        .iter()
                        .any(|exclusion| exclusion.matches(attributes))
            }
        }
    }
}

/// Returns the interfaces of `section` that belong to the group.
pub fn members<'a>(
    group_name: &str,
    config: &GroupConfiguration,
    section: &'a [Interface],
) -> impl Iterator<Item = &'a Interface> {
    section
        .iter()
        .filter(move |iface| config.is_member(group_name, &iface.attributes))
}

/// Combined operational state: up if every member is up, degraded if only some are,
/// down if none are or the group is empty.
pub fn group_oper_status<'a>(members: impl IntoIterator<Item = &'a Attributes>) -> OperStatus {
    let (total, up) = members
        .into_iter()
        .fold((0usize, 0usize), |(total, up), attributes| {
            (total + 1, up + usize::from(attributes.is_up()))
        });
    match up {
        0 => OperStatus::Down,
        up if up == total => OperStatus::Up,
        _ => OperStatus::Degraded,
    }
}

/// Sum of the speeds of the members that are up.
pub fn group_speed<'a>(members: impl IntoIterator<Item = &'a Attributes>) -> f64 {
    members
        .into_iter()
        .filter(|attributes| attributes.is_up())
        .map(|attributes| attributes.speed)
        .sum()
}

/// Attributes of the synthetic group interface.
///
/// The port type is taken from the last member. The output queue length is the sum over
/// the members that are up and unknown if one of them does not report it.
pub fn aggregate_attributes<'a>(
    group_name: &str,
    members: impl IntoIterator<Item = &'a Attributes>,
) -> Attributes {
    let members: Vec<&Attributes> = members.into_iter().collect();
    let oper_status = group_oper_status(members.iter().copied());

    let out_qlen = if oper_status.is_down() {
        None
    } else {
        members
            .iter()
            .filter(|attributes| attributes.is_up())
            .try_fold(0.0, |sum, attributes| Some(sum + attributes.out_qlen?))
    };

    let nodes: BTreeSet<&str> = members
        .iter()
        .map(|attributes| attributes.node.as_deref().unwrap_or("None"))
        .collect();
    let mut alias_info = Vec::new();
    if nodes.len() > 1 {
        alias_info.push(format!(
            "nodes: {}",
            nodes.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }
    if !members.is_empty() {
        alias_info.push(format!("{} grouped interfaces", members.len()));
    }

    Attributes {
        index: group_name.to_owned(),
        descr: group_name.to_owned(),
        alias: alias_info.join(", "),
        port_type: members
            .last()
            .map(|attributes| attributes.port_type.clone())
            .unwrap_or_default(),
        speed: group_speed(members.iter().copied()),
        oper_status,
        admin_status: None,
        phys_address: PhysAddress::default(),
        out_qlen,
        speed_as_text: String::new(),
        group: None,
        node: None,
        extra_info: None,
    }
}

/// Combines the members of a group into one interface carrying the summed counters
/// (or summed rates, if the data source delivers rates).
///
/// Members whose traffic is of the other kind than the first member's are skipped.
pub fn aggregate(
    group_name: &str,
    config: &GroupConfiguration,
    section: &[Interface],
) -> Interface {
    let grouped: Vec<&Interface> = members(group_name, config, section).collect();
    let attributes =
        aggregate_attributes(group_name, grouped.iter().map(|iface| &iface.attributes));

    let mut traffic = grouped
        .first()
        .map(|iface| match &iface.traffic {
            Traffic::Counters(_) => Traffic::Counters(Default::default()),
            Traffic::Rates(_) => Traffic::Rates(Default::default()),
        })
        .unwrap_or_default();
    for member in &grouped {
        match (&mut traffic, &member.traffic) {
            (Traffic::Counters(sum), Traffic::Counters(counters)) => *sum += counters,
            (Traffic::Rates(sum), Traffic::Rates(rates)) => *sum += rates,
            _ => log::warn!(
                target: "group",
                "skipping member {} of group {group_name}: mixed counters and rates",
                member.attributes.index
            ),
        }
    }

    Interface {
        attributes,
        traffic,
    }
}

/// Combines the rates of the group members. Only members that are up contribute, both
/// to the rates and to the reported rate issues.
pub fn aggregate_rates(group_name: &str, members: &[InterfaceWithRates]) -> InterfaceWithRates {
    let attributes = aggregate_attributes(group_name, members.iter().map(|m| &m.attributes));
    let up_members = || members.iter().filter(|member| member.attributes.is_up());

    let rates = up_members().fold(RatesWithAverages::default(), |sum, member| {
        sum.accumulate(&member.rates)
    });
    let rate_issues = up_members()
        .flat_map(|member| member.rate_issues.iter().cloned())
        .collect();

    InterfaceWithRates {
        attributes,
        rates,
        rate_issues,
    }
}

/// A group member as shown in the group summary.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberInfo {
    pub name: String,
    pub oper_status: OperStatus,
    pub admin_status: Option<OperStatus>,
}

impl fmt::Display for MemberInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.admin_status {
            None => write!(f, "{} ({})", self.name, self.oper_status.name()),
            Some(admin) => write!(
                f,
                "{} (op. state: {}, admin state: {})",
                self.name,
                self.oper_status.name(),
                admin.name()
            ),
        }
    }
}

/// Group members per cluster node, in order of first appearance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupMembers(Vec<(Option<String>, Vec<MemberInfo>)>);

impl GroupMembers {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (Option<&str>, &[MemberInfo])> {
        self.0
            .iter()
            .map(|(node, members)| (node.as_deref(), members.as_slice()))
    }

    fn push(&mut self, node: Option<&str>, member: MemberInfo) {
        match self.0.iter_mut().find(|(n, _)| n.as_deref() == node) {
            Some((_, members)) => members.push(member),
            None => self.0.push((node.map(str::to_owned), vec![member])),
        }
    }
}

impl fmt::Display for GroupMembers {
    /// `[a (up), b (down)]`, one bracket per node. Node names are only shown if the
    /// members span more than one node.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let show_nodes = self.0.len() > 1;
        for (i, (node, members)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            let names: Vec<String> = members.iter().map(MemberInfo::to_string).collect();
            write!(f, "[{}", names.join(", "))?;
            if let (true, Some(node)) = (show_nodes, node) {
                write!(f, " on node {node}")?;
            }
            f.write_str("]")?;
        }
        Ok(())
    }
}

/// Lists the members named by `config.member_appearance`. Index names are padded like
/// the group item if that starts with a zero.
pub fn group_members<'a>(
    group_name: &str,
    config: &GroupConfiguration,
    members: impl IntoIterator<Item = &'a Attributes>,
    section: &[Interface],
) -> GroupMembers {
    let pad_width = group_name
        .starts_with('0')
        .then(|| naming::pad_width(section.iter().map(|iface| &iface.attributes)))
        .flatten();
    let mut listing = GroupMembers::default();
    for attributes in members {
        listing.push(
            attributes.node.as_deref(),
            MemberInfo {
                name: naming::compute_item(config.member_appearance, attributes, pad_width).item,
                oper_status: attributes.oper_status.clone(),
                admin_status: attributes.admin_status.clone(),
            },
        );
    }
    listing
}
