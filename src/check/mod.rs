//! Checks one discovered item per cycle.
//!
//! A check emits the identity and state of the interface, its speed and, unless the
//! interface is down, its traffic and packet rates with their levels. Rates are derived
//! from the counters through the caller's [`ValueStore`], which the check mutates in place.
use crate::config::{self, CheckParams};
use crate::group::{self, GroupConfiguration, GroupMembers};
use crate::interface::Interface;
use crate::levels::{self, ReferenceSpeeds, TrafficLevels};
use crate::rates::{InterfaceWithRates, RatesWithAverages};
use crate::store::ValueStore;

mod identity;
mod matching;
mod output;
mod predictive;
mod status;
mod threshold;
mod traffic;

pub use matching::matching_interfaces_for_item;
pub use output::{CheckEntry, CheckResult, Metric, Severity, State, worst_state};
pub use predictive::{PredictiveComparator, PredictiveOutcome};
pub use threshold::check_levels;

/// Name shown for grouped items.
pub const GROUP_NAME: &str = "Interface group";

/// Checks items against the interfaces of the current cycle.
#[derive(Default)]
pub struct Checker<'a> {
    comparator: Option<&'a dyn PredictiveComparator>,
}

impl<'a> Checker<'a> {
    /// A checker without predictive levels support.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_comparator(comparator: &'a dyn PredictiveComparator) -> Self {
        Self {
            comparator: Some(comparator),
        }
    }

    /// Checks `item` within `section`.
    ///
    /// Returns no entries if the item is not present. Only configuration errors abort the
    /// check; they are reported before the store is touched.
    ///
    /// # Example
    /// ```
    /// use ifmon::check::Checker;
    /// use ifmon::config::CheckParams;
    /// use ifmon::interface::{Attributes, Counters, Interface, OperStatus};
    /// use ifmon::store::ValueStore;
    ///
    /// let iface = |in_octets| {
    ///     Interface::with_counters(
    ///         Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
    ///         Counters { in_octets: Some(in_octets), ..Default::default() },
    ///     )
    /// };
    /// let mut store = ValueStore::new();
    /// let checker = Checker::new();
    /// let params = CheckParams::default();
    /// checker.check("1", &params, &[iface(1000)], 0.0, &mut store).unwrap();
    /// let entries = checker.check("1", &params, &[iface(2000)], 5.0, &mut store).unwrap();
    /// let traffic_in = entries.iter().find_map(|e| e.as_metric()).unwrap();
    /// assert_eq!((traffic_in.name.as_str(), traffic_in.value), ("in", 200.0));
    /// ```
    pub fn check(
        &self,
        item: &str,
        params: &CheckParams,
        section: &[Interface],
        timestamp: f64,
        store: &mut ValueStore,
    ) -> config::Result<Vec<CheckEntry>> {
        self.validate(params)?;
        match &params.discovered.aggregate {
            Some(config) => self.check_group(item, config, params, section, timestamp, store),
            None => self.check_ungrouped(item, params, section, timestamp, store),
        }
    }

    fn validate(&self, params: &CheckParams) -> config::Result<()> {
        if self.comparator.is_some() {
            return Ok(());
        }
        match params
            .traffic_rules()
            .find(|(_, levels)| matches!(levels, TrafficLevels::Predictive { .. }))
        {
            Some((direction, _)) => Err(config::Error::PredictiveWithoutComparator {
                direction: direction.name().to_owned(),
            }),
            None => Ok(()),
        }
    }

    /// On clusters the item may match on several nodes. The node with the most outgoing
    /// traffic is likely the active one and its results are reported.
    fn check_ungrouped(
        &self,
        item: &str,
        params: &CheckParams,
        section: &[Interface],
        timestamp: f64,
        store: &mut ValueStore,
    ) -> config::Result<Vec<CheckEntry>> {
        let matches = matching_interfaces_for_item(item, section, params.discovered.item_appearance);
        if matches.is_empty() {
            log::debug!(target: "check", "item {item} not found in section");
            return Ok(Vec::new());
        }

        let mut fastest = None;
        let mut last = Vec::new();
        let mut max_out_traffic = -1.0;
        for iface in matches {
            // Down interfaces report no rates, so their counters are not stored either.
            let with_rates = if iface.attributes.oper_status.is_down() {
                InterfaceWithRates {
                    attributes: iface.attributes.clone(),
                    rates: RatesWithAverages::default(),
                    rate_issues: Vec::new(),
                }
            } else {
                InterfaceWithRates::compute(iface, timestamp, store, params.averaging())
            };
            let entries = self.check_single_interface(
                item,
                params,
                &with_rates,
                None,
                iface.attributes.node.is_none(),
            )?;

            let out_traffic = entries
                .iter()
                .filter_map(CheckEntry::as_metric)
                .find(|metric| metric.name == "out")
                .map(|metric| metric.value);
            match out_traffic {
                Some(out_traffic) if out_traffic > max_out_traffic => {
                    log::trace!(
                        target: "check",
                        "{item}: node {:?} has the most outgoing traffic",
                        iface.attributes.node
                    );
                    max_out_traffic = out_traffic;
                    fastest = Some(entries);
                }
                _ => last = entries,
            }
        }
        Ok(fastest.unwrap_or(last))
    }

    fn check_group(
        &self,
        item: &str,
        config: &GroupConfiguration,
        params: &CheckParams,
        section: &[Interface],
        timestamp: f64,
        store: &mut ValueStore,
    ) -> config::Result<Vec<CheckEntry>> {
        let members: Vec<InterfaceWithRates> = group::members(item, config, section)
            .map(|iface| InterfaceWithRates::compute(iface, timestamp, store, params.averaging()))
            .collect();
        log::debug!(target: "check", "group {item} has {} members", members.len());

        let aggregated = group::aggregate_rates(item, &members);
        let listing = group::group_members(
            item,
            config,
            members.iter().map(|member| &member.attributes),
            section,
        );
        // Discovered speed and state describe a single node only.
        let use_discovered = section
            .first()
            .is_none_or(|iface| iface.attributes.node.is_none());
        self.check_single_interface(item, params, &aggregated, Some(&listing), use_discovered)
    }

    fn check_single_interface(
        &self,
        item: &str,
        params: &CheckParams,
        iface: &InterfaceWithRates,
        group_members: Option<&GroupMembers>,
        use_discovered: bool,
    ) -> config::Result<Vec<CheckEntry>> {
        let attributes = &iface.attributes;
        let group_members = group_members.filter(|members| !members.is_empty());
        let mut entries: Vec<CheckEntry> = Vec::new();

        if let Some(name) = identity::interface_name(
            group_members.map(|_| GROUP_NAME),
            item,
            params.infotext_format,
            attributes,
        ) {
            entries.push(name.into());
        }
        entries.extend(
            status::interface_status(
                attributes,
                params.state_mappings.as_ref(),
                params.target_oper_states(use_discovered),
                params.target_admin_states(use_discovered),
            )
            .into_iter()
            .map(CheckEntry::from),
        );
        if let Some(extra_info) = &attributes.extra_info {
            entries.push(CheckResult::summary(State::Ok, extra_info.as_str()).into());
        }
        if !attributes.phys_address.is_empty() {
            entries.push(
                CheckResult::summary(State::Ok, format!("MAC: {}", attributes.phys_address))
                    .into(),
            );
        }
        if let Some(members) = group_members {
            entries.push(CheckResult::summary(State::Ok, format!("Members: {members}")).into());
        }

        let target_speed = params.target_speed(use_discovered);
        entries.push(status::check_speed(attributes, target_speed).into());

        // Bytes per second from here on.
        let speed = if attributes.speed != 0.0 {
            Some(attributes.speed / 8.0)
        } else {
            target_speed
                .filter(|speed| *speed != 0.0)
                .map(|speed| speed / 8.0)
        };
        let assumed = |assumed: Option<f64>| {
            assumed
                .filter(|speed| *speed != 0.0)
                .map(|speed| speed / 8.0)
                .or(speed)
        };
        let speeds = ReferenceSpeeds::new(
            assumed(params.assumed_speed_in),
            assumed(params.assumed_speed_out),
        );
        let bandwidth_levels = levels::bandwidth_levels(params.traffic_rules(), speeds, params.unit);

        // Devices keep reporting counters on down links.
        if attributes.oper_status.is_down() {
            return Ok(entries);
        }

        if let Some(out_qlen) = attributes.out_qlen {
            entries.push(Metric::new("outqlen", out_qlen).into());
        }

        traffic::Bandwidth {
            speeds,
            levels: bandwidth_levels,
            unit: params.unit,
            assumed_speed: params.assumed_speed_in.is_some() || params.assumed_speed_out.is_some(),
            monitor_total: params.monitor_total(),
            comparator: self.comparator,
        }
        .check(&iface.rates, &mut entries)?;
        traffic::check_packets(&iface.rates, params, &mut entries);

        if !iface.rate_issues.is_empty() {
            let issues: Vec<String> = iface
                .rate_issues
                .iter()
                .map(|(kind, issue)| format!("{kind}: {issue}"))
                .collect();
            entries.push(
                CheckResult::notice(
                    State::Ok,
                    format!(
                        "Could not compute rates for the following counter(s):\n{}",
                        issues.join("\n")
                    ),
                )
                .into(),
            );
        }
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{Attributes, Counters, OperStatus, Rates};

    const RATE_NAMES: [&str; 15] = [
        "in", "out", "total", "inerr", "outerr", "indisc", "outdisc", "inmcast", "outmcast",
        "inbcast", "outbcast", "inucast", "outucast", "innucast", "outnucast",
    ];

    fn eth0(oper_status: OperStatus, in_octets: u64) -> Interface {
        Interface::with_counters(
            Attributes::new("1", "eth0", "eth0", oper_status)
                .unwrap()
                .with_speed(1_000_000_000.0),
            Counters {
                in_octets: Some(in_octets),
                ..Default::default()
            },
        )
    }

    fn texts(entries: &[CheckEntry]) -> Vec<&str> {
        entries
            .iter()
            .filter_map(CheckEntry::as_result)
            .map(|result| result.text.as_str())
            .collect()
    }

    fn metrics(entries: &[CheckEntry]) -> Vec<&Metric> {
        entries.iter().filter_map(CheckEntry::as_metric).collect()
    }

    #[test]
    fn test_first_cycle_initializes_counters() {
        let mut store = ValueStore::new();
        let entries = Checker::new()
            .check("1", &CheckParams::default(), &[eth0(OperStatus::Up, 1000)], 0.0, &mut store)
            .unwrap();
        assert!(metrics(&entries).is_empty());
        assert_eq!(
            texts(&entries),
            vec![
                "[eth0]",
                "(up)",
                "Speed: 1 GBit/s",
                "Could not compute rates for the following counter(s):\n\
                 in_octets: Initialized: 'in_octets.1.eth0.eth0.None'",
            ]
        );
        let last = entries.last().and_then(CheckEntry::as_result).unwrap();
        assert_eq!(last.severity, Severity::Notice);
        assert_eq!(last.state, State::Ok);
    }

    #[test]
    fn test_second_cycle_reports_traffic() {
        let mut store = ValueStore::new();
        let checker = Checker::new();
        let params = CheckParams::default();
        checker
            .check("1", &params, &[eth0(OperStatus::Up, 1000)], 0.0, &mut store)
            .unwrap();
        let entries = checker
            .check("1", &params, &[eth0(OperStatus::Up, 2000)], 5.0, &mut store)
            .unwrap();

        assert_eq!(
            metrics(&entries),
            vec![&Metric::new("in", 200.0).with_boundaries(Some(0.0), Some(125_000_000.0))]
        );
        assert!(texts(&entries).contains(&"In: 200 B/s (0.00016%)"));
        assert_eq!(worst_state(&entries), State::Ok);
    }

    #[test]
    fn test_down_interface_has_no_rates() {
        let mut store = ValueStore::new();
        let checker = Checker::new();
        let params = CheckParams::default();
        for (timestamp, in_octets) in [(0.0, 1000), (5.0, 2000)] {
            let entries = checker
                .check(
                    "1",
                    &params,
                    &[eth0(OperStatus::Down, in_octets)],
                    timestamp,
                    &mut store,
                )
                .unwrap();
            assert!(
                metrics(&entries)
                    .iter()
                    .all(|metric| !RATE_NAMES.contains(&metric.name.as_str()))
            );
            assert_eq!(texts(&entries), vec!["[eth0]", "(down)", "Speed: 1 GBit/s"]);
        }
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_item_yields_nothing() {
        let mut store = ValueStore::new();
        let entries = Checker::new()
            .check("7", &CheckParams::default(), &[eth0(OperStatus::Up, 1)], 0.0, &mut store)
            .unwrap();
        assert!(entries.is_empty());
        assert!(store.is_empty());
    }

    #[test]
    fn test_speed_target_and_mac() {
        let mut store = ValueStore::new();
        let mut iface = eth0(OperStatus::Up, 0);
        iface.attributes.phys_address = "0a:00:27:00:00:00".parse().unwrap();
        let params: CheckParams =
            serde_json::from_str(r#"{"discovered_speed": 100000000, "state": ["1"]}"#).unwrap();
        let entries = Checker::new()
            .check("1", &params, &[iface], 0.0, &mut store)
            .unwrap();
        let results: Vec<&CheckResult> =
            entries.iter().filter_map(CheckEntry::as_result).collect();
        assert_eq!(results[2].text, "MAC: 0A:00:27:00:00:00");
        assert_eq!(
            *results[3],
            CheckResult::summary(State::Warn, "Speed: 1 GBit/s (expected: 100 MBit/s)")
        );
    }

    #[test]
    fn test_group_sums_member_rates() {
        let member = |index: &str, in_octets| {
            Interface::with_counters(
                Attributes::new(index, format!("eth{index}"), "", OperStatus::Up)
                    .unwrap()
                    .with_speed(1_000_000_000.0)
                    .with_group("bond0"),
                Counters {
                    in_octets: Some(in_octets),
                    ..Default::default()
                },
            )
        };
        let params = CheckParams::default().for_service(&config::DiscoveredParams {
            aggregate: Some(GroupConfiguration::from_data_source(config::NamingScheme::Index)),
            ..Default::default()
        });
        let mut store = ValueStore::new();
        let checker = Checker::new();
        checker
            .check("bond0", &params, &[member("1", 1000), member("2", 0)], 0.0, &mut store)
            .unwrap();
        let entries = checker
            .check("bond0", &params, &[member("1", 2000), member("2", 500)], 10.0, &mut store)
            .unwrap();

        assert_eq!(
            texts(&entries)[..4],
            [
                "Interface group",
                "(up)",
                "Members: [1 (up), 2 (up)]",
                "Speed: 2 GBit/s"
            ]
        );
        assert_eq!(
            metrics(&entries),
            vec![&Metric::new("in", 150.0).with_boundaries(Some(0.0), Some(250_000_000.0))]
        );
    }

    #[test]
    fn test_empty_group_is_down() {
        let params = CheckParams::default().for_service(&config::DiscoveredParams {
            aggregate: Some(GroupConfiguration::from_data_source(config::NamingScheme::Index)),
            ..Default::default()
        });
        let entries = Checker::new()
            .check(
                "bond0",
                &params,
                &[eth0(OperStatus::Up, 1)],
                0.0,
                &mut ValueStore::new(),
            )
            .unwrap();
        assert_eq!(texts(&entries), vec!["(down)", "Speed: unknown"]);
    }

    #[test]
    fn test_cluster_reports_node_with_most_outgoing_traffic() {
        let node = |out_octets| {
            vec![Interface::with_rates(
                Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
                Rates {
                    out_octets: Some(out_octets),
                    ..Default::default()
                },
            )]
        };
        let section = crate::cluster::reduce(vec![
            ("node1".to_owned(), node(10.0)),
            ("node2".to_owned(), node(50.0)),
            ("node3".to_owned(), node(20.0)),
        ]);
        let entries = Checker::new()
            .check("1", &CheckParams::default(), &section, 0.0, &mut ValueStore::new())
            .unwrap();
        assert_eq!(texts(&entries)[0], "[eth0] on node2");
        assert_eq!(metrics(&entries)[0].value, 50.0);
    }

    #[test]
    fn test_predictive_levels_without_comparator_fail_early() {
        let params: CheckParams = serde_json::from_str(
            r#"{"traffic": [{"direction": "out", "kind": "predictive", "config": {}}]}"#,
        )
        .unwrap();
        let mut store = ValueStore::new();
        let err = Checker::new()
            .check("1", &params, &[eth0(OperStatus::Up, 1)], 0.0, &mut store)
            .unwrap_err();
        assert_eq!(
            err,
            config::Error::PredictiveWithoutComparator {
                direction: "out".to_owned()
            }
        );
        assert!(store.is_empty());
    }

    struct StaticPrediction;

    impl PredictiveComparator for StaticPrediction {
        fn compare(
            &self,
            value: f64,
            config: &serde_json::Value,
            metric_name: &str,
            label: &str,
            render: fn(f64) -> String,
        ) -> PredictiveOutcome {
            let state = if value > config["max"].as_f64().unwrap_or(f64::MAX) {
                State::Crit
            } else {
                State::Ok
            };
            PredictiveOutcome {
                result: CheckResult::summary(
                    state,
                    format!("{label}: {} (predicted: {})", render(value), render(100.0)),
                ),
                metric: Metric::new(metric_name, value),
                reference_curve: vec![Metric::new(format!("predict_{metric_name}"), 100.0)],
            }
        }
    }

    #[test]
    fn test_predictive_levels_use_comparator() {
        let params: CheckParams = serde_json::from_str(
            r#"{"traffic": [{"direction": "in", "kind": "predictive", "config": {"max": 150}}]}"#,
        )
        .unwrap();
        let iface = Interface::with_rates(
            Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
            Rates {
                in_octets: Some(200.0),
                ..Default::default()
            },
        );
        let comparator = StaticPrediction;
        let entries = Checker::with_comparator(&comparator)
            .check("1", &params, &[iface], 0.0, &mut ValueStore::new())
            .unwrap();

        assert_eq!(
            metrics(&entries),
            vec![
                &Metric::new("predict_in", 100.0),
                &Metric::new("in", 200.0).with_boundaries(Some(0.0), None),
            ]
        );
        let result = entries
            .iter()
            .filter_map(CheckEntry::as_result)
            .find(|result| result.text.starts_with("In"))
            .unwrap();
        assert_eq!(result.state, State::Crit);
        assert_eq!(result.text, "In: 200 B/s (predicted: 100 B/s)");
    }
}
