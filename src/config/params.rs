use super::{NamingScheme, StateMappings};
use crate::group::GroupConfiguration;
use crate::interface::OperStatus;
use crate::levels::{
    BandwidthUnit, DirectionalPacketLevels, TrafficDirection, TrafficLevels, TrafficRule,
    UpperLevels,
};
use crate::rates::AveragingParams;

/// Bracket text shown next to the item name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfotextFormat {
    Alias,
    Description,
    AliasAndDescription,
    AliasOrDescription,
    DescriptionOrAlias,
}

/// Parameters captured when an item was discovered.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct DiscoveredParams {
    /// Naming scheme the item name was produced with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_appearance: Option<NamingScheme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_oper_status: Option<Vec<OperStatus>>,
    /// Bits per second.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discovered_admin_status: Option<Vec<OperStatus>>,
    /// Present if the item is a group.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<GroupConfiguration>,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Deserialize)]
pub struct TotalTraffic {
    #[serde(default)]
    pub levels: Vec<TrafficLevels>,
}

/// Check parameters of one item: the user configuration merged with the parameters
/// captured at discovery.
///
/// Missing keys take their defaults, so `{}` is a valid configuration. Speeds are in bits
/// per second.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
#[serde(default)]
pub struct CheckParams {
    #[serde(flatten)]
    pub discovered: DiscoveredParams,
    /// Expected speed.
    pub speed: Option<f64>,
    /// Expected operational states.
    pub state: Option<Vec<OperStatus>>,
    /// Expected admin states.
    pub admin_state: Option<Vec<OperStatus>>,
    pub assumed_speed_in: Option<f64>,
    pub assumed_speed_out: Option<f64>,
    /// Backlog in minutes for averaging the octet rates.
    pub average: Option<u32>,
    /// Backlog in minutes for averaging the multicast and broadcast rates.
    pub average_bm: Option<u32>,
    pub unit: BandwidthUnit,
    pub traffic: Vec<TrafficRule>,
    pub total_traffic: Option<TotalTraffic>,
    pub errors: Option<DirectionalPacketLevels>,
    pub discards: Option<DirectionalPacketLevels>,
    pub multicast: Option<DirectionalPacketLevels>,
    pub broadcast: Option<DirectionalPacketLevels>,
    pub unicast: Option<DirectionalPacketLevels>,
    pub nucasts: Option<UpperLevels>,
    pub infotext_format: Option<InfotextFormat>,
    pub state_mappings: Option<StateMappings>,
}

impl Default for CheckParams {
    fn default() -> Self {
        Self {
            discovered: DiscoveredParams::default(),
            speed: None,
            state: None,
            admin_state: None,
            assumed_speed_in: None,
            assumed_speed_out: None,
            average: None,
            average_bm: None,
            unit: BandwidthUnit::Byte,
            traffic: Vec::new(),
            total_traffic: None,
            errors: Some(DirectionalPacketLevels::default_errors()),
            discards: None,
            multicast: None,
            broadcast: None,
            unicast: None,
            nucasts: None,
            infotext_format: None,
            state_mappings: None,
        }
    }
}

impl CheckParams {
    /// These parameters with the discovered parameters of a service.
    pub fn for_service(&self, discovered: &DiscoveredParams) -> CheckParams {
        CheckParams {
            discovered: discovered.clone(),
            ..self.clone()
        }
    }

    /// The configured speed, else the discovered one if `use_discovered` is set.
    /// A discovered speed of zero means the speed was unknown and is not a target.
    pub fn target_speed(&self, use_discovered: bool) -> Option<f64> {
        self.speed.or_else(|| {
            use_discovered
                .then_some(self.discovered.discovered_speed)
                .flatten()
                .filter(|speed| *speed > 0.0)
        })
    }

    pub fn target_oper_states(&self, use_discovered: bool) -> Option<&[OperStatus]> {
        self.state
            .as_deref()
            .or_else(|| {
                use_discovered
                    .then(|| self.discovered.discovered_oper_status.as_deref())
                    .flatten()
            })
    }

    pub fn target_admin_states(&self, use_discovered: bool) -> Option<&[OperStatus]> {
        self.admin_state
            .as_deref()
            .or_else(|| {
                use_discovered
                    .then(|| self.discovered.discovered_admin_status.as_deref())
                    .flatten()
            })
    }

    pub fn averaging(&self) -> AveragingParams {
        AveragingParams {
            octets: self.average,
            broadcast_multicast: self.average_bm,
        }
    }

    pub fn monitor_total(&self) -> bool {
        self.total_traffic.is_some()
    }

    /// All traffic rules in configuration order, with the total traffic levels last.
    pub fn traffic_rules(&self) -> impl Iterator<Item = (TrafficDirection, &TrafficLevels)> {
        self.traffic
            .iter()
            .map(|rule| (rule.direction, &rule.levels))
            .chain(
                self.total_traffic
                    .iter()
                    .flat_map(|total| total.levels.iter())
                    .map(|levels| (TrafficDirection::Total, levels)),
            )
    }
}
