//! Turns the counters of one interface into rates and averages for one check cycle.
use std::fmt;

use crate::average::{self, Average};
use crate::error::ResultOkLogExt;
use crate::interface::{Attributes, CounterKind, Interface, Rates, Traffic};
use crate::store::{RateError, RateOutcome, ValueStore};

/// Why the rate of a counter is missing this cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum RateIssue {
    /// First sample for this key; the rate is available from the next cycle on.
    Initialized { key: String },
    Failed(RateError),
}

impl fmt::Display for RateIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RateIssue::Initialized { key } => write!(f, "Initialized: '{key}'"),
            RateIssue::Failed(err) => write!(f, "{err}"),
        }
    }
}

/// A rate and, if averaging is configured for it, its moving average.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateWithAverage {
    pub rate: f64,
    pub average: Option<Average>,
}

impl RateWithAverage {
    pub fn new(rate: f64) -> Self {
        Self {
            rate,
            average: None,
        }
    }

    /// The value levels are checked against: the average if there is one.
    pub fn filtered(&self) -> f64 {
        self.average.map_or(self.rate, |average| average.value)
    }

    /// Adds two rates. The combined average is dropped if only one side has one or if
    /// the backlogs differ.
    pub fn combine(self, other: RateWithAverage) -> RateWithAverage {
        let average = match (self.average, other.average) {
            (Some(a), Some(b)) => a.checked_add(b).ok_log(),
            _ => None,
        };
        RateWithAverage {
            rate: self.rate + other.rate,
            average,
        }
    }
}

/// Adds two optional rates, `None` if either side is missing.
pub fn add_both(
    a: Option<RateWithAverage>,
    b: Option<RateWithAverage>,
) -> Option<RateWithAverage> {
    Some(a?.combine(b?))
}

/// Adds two optional rates, keeping whichever side is present.
pub fn add_present(
    a: Option<RateWithAverage>,
    b: Option<RateWithAverage>,
) -> Option<RateWithAverage> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.combine(b)),
        (a, b) => a.or(b),
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RatesWithAverages {
    pub in_octets: Option<RateWithAverage>,
    pub in_ucast: Option<RateWithAverage>,
    pub in_mcast: Option<RateWithAverage>,
    pub in_bcast: Option<RateWithAverage>,
    pub in_nucast: Option<RateWithAverage>,
    pub in_disc: Option<RateWithAverage>,
    pub in_err: Option<RateWithAverage>,
    pub out_octets: Option<RateWithAverage>,
    pub out_ucast: Option<RateWithAverage>,
    pub out_mcast: Option<RateWithAverage>,
    pub out_bcast: Option<RateWithAverage>,
    pub out_nucast: Option<RateWithAverage>,
    pub out_disc: Option<RateWithAverage>,
    pub out_err: Option<RateWithAverage>,
    pub total_octets: Option<RateWithAverage>,
}

impl RatesWithAverages {
    /// Element-wise sum where a missing value on one side counts as zero.
    pub fn accumulate(&self, other: &RatesWithAverages) -> RatesWithAverages {
        RatesWithAverages {
            in_octets: add_present(self.in_octets, other.in_octets),
            in_ucast: add_present(self.in_ucast, other.in_ucast),
            in_mcast: add_present(self.in_mcast, other.in_mcast),
            in_bcast: add_present(self.in_bcast, other.in_bcast),
            in_nucast: add_present(self.in_nucast, other.in_nucast),
            in_disc: add_present(self.in_disc, other.in_disc),
            in_err: add_present(self.in_err, other.in_err),
            out_octets: add_present(self.out_octets, other.out_octets),
            out_ucast: add_present(self.out_ucast, other.out_ucast),
            out_mcast: add_present(self.out_mcast, other.out_mcast),
            out_bcast: add_present(self.out_bcast, other.out_bcast),
            out_nucast: add_present(self.out_nucast, other.out_nucast),
            out_disc: add_present(self.out_disc, other.out_disc),
            out_err: add_present(self.out_err, other.out_err),
            total_octets: add_present(self.total_octets, other.total_octets),
        }
    }
}

/// Backlogs of the configured averages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AveragingParams {
    /// Applies to in/out octets.
    pub octets: Option<u32>,
    /// Applies to multicast and broadcast packets.
    pub broadcast_multicast: Option<u32>,
}

impl AveragingParams {
    fn backlog(&self, kind: CounterKind) -> Option<u32> {
        match kind {
            CounterKind::InOctets | CounterKind::OutOctets => self.octets,
            CounterKind::InMcast
            | CounterKind::InBcast
            | CounterKind::OutMcast
            | CounterKind::OutBcast => self.broadcast_multicast,
            _ => None,
        }
    }
}

/// An interface with the rates of the current cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceWithRates {
    pub attributes: Attributes,
    pub rates: RatesWithAverages,
    /// Counters whose rate could not be computed, in counter order.
    pub rate_issues: Vec<(CounterKind, RateIssue)>,
}

impl InterfaceWithRates {
    /// Computes the rates of `iface`.
    ///
    /// Counters are turned into rates through `store`. Rates supplied by the data source
    /// are taken as they are and the store is only used for averaging.
    pub fn compute(
        iface: &Interface,
        timestamp: f64,
        store: &mut ValueStore,
        averaging: AveragingParams,
    ) -> Self {
        let identity = iface.attributes.id_for_value_store();
        let (rates, rate_issues) = match &iface.traffic {
            Traffic::Counters(counters) => {
                let mut rates = Rates::default();
                let mut rate_issues = Vec::new();
                for kind in CounterKind::ALL {
                    let Some(value) = counters.get(kind) else {
                        continue;
                    };
                    let key = format!("{kind}.{identity}");
                    match store.rate(&key, timestamp, value as f64) {
                        Ok(RateOutcome::Rate(rate)) => rates.set(kind, Some(rate)),
                        Ok(RateOutcome::Pending) => {
                            rate_issues.push((kind, RateIssue::Initialized { key }))
                        }
                        Err(err) => rate_issues.push((kind, RateIssue::Failed(err))),
                    }
                }
                (rates, rate_issues)
            }
            Traffic::Rates(rates) => (rates.clone(), Vec::new()),
        };

        let mut with_average = |kind: CounterKind| {
            let rate = rates.get(kind)?;
            let average = averaging.backlog(kind).map(|backlog_minutes| Average {
                value: average::average(
                    store,
                    &average::average_key(&format!("{kind}.{identity}")),
                    timestamp,
                    rate,
                    backlog_minutes,
                ),
                backlog_minutes,
            });
            Some(RateWithAverage { rate, average })
        };

        let in_octets = with_average(CounterKind::InOctets);
        let in_ucast = with_average(CounterKind::InUcast);
        let in_mcast = with_average(CounterKind::InMcast);
        let in_bcast = with_average(CounterKind::InBcast);
        let in_disc = with_average(CounterKind::InDisc);
        let in_err = with_average(CounterKind::InErr);
        let out_octets = with_average(CounterKind::OutOctets);
        let out_ucast = with_average(CounterKind::OutUcast);
        let out_mcast = with_average(CounterKind::OutMcast);
        let out_bcast = with_average(CounterKind::OutBcast);
        let out_disc = with_average(CounterKind::OutDisc);
        let out_err = with_average(CounterKind::OutErr);

        Self {
            attributes: iface.attributes.clone(),
            rates: RatesWithAverages {
                in_octets,
                in_ucast,
                in_mcast,
                in_bcast,
                in_nucast: add_both(in_mcast, in_bcast),
                in_disc,
                in_err,
                out_octets,
                out_ucast,
                out_mcast,
                out_bcast,
                out_nucast: add_both(out_mcast, out_bcast),
                out_disc,
                out_err,
                total_octets: add_both(in_octets, out_octets),
            },
            rate_issues,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interface::{Counters, OperStatus};

    fn eth0(counters: Counters) -> Interface {
        Interface::with_counters(
            Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
            counters,
        )
    }

    #[test]
    fn test_first_cycle_reports_initialized_counters() {
        let mut store = ValueStore::new();
        let iface = eth0(Counters {
            in_octets: Some(1000),
            out_octets: Some(10),
            ..Default::default()
        });
        let computed =
            InterfaceWithRates::compute(&iface, 0.0, &mut store, AveragingParams::default());
        assert_eq!(computed.rates, RatesWithAverages::default());
        assert_eq!(computed.rate_issues.len(), 2);
        assert_eq!(
            computed.rate_issues[0].1.to_string(),
            "Initialized: 'in_octets.1.eth0.eth0.None'"
        );
        assert_eq!(computed.rate_issues[1].0, CounterKind::OutOctets);
    }

    #[test]
    fn test_second_cycle_computes_rates_and_derived_values() {
        let mut store = ValueStore::new();
        let first = eth0(Counters {
            in_octets: Some(1000),
            out_octets: Some(0),
            in_mcast: Some(0),
            in_bcast: Some(0),
            ..Default::default()
        });
        InterfaceWithRates::compute(&first, 0.0, &mut store, AveragingParams::default());
        let second = eth0(Counters {
            in_octets: Some(2000),
            out_octets: Some(500),
            in_mcast: Some(10),
            in_bcast: Some(5),
            ..Default::default()
        });
        let computed =
            InterfaceWithRates::compute(&second, 5.0, &mut store, AveragingParams::default());
        assert!(computed.rate_issues.is_empty());
        assert_eq!(computed.rates.in_octets, Some(RateWithAverage::new(200.0)));
        assert_eq!(computed.rates.total_octets, Some(RateWithAverage::new(300.0)));
        assert_eq!(computed.rates.in_nucast, Some(RateWithAverage::new(3.0)));
        assert_eq!(computed.rates.out_nucast, None);
        assert_eq!(computed.rates.in_err, None);
    }

    #[test]
    fn test_overflow_only_drops_affected_counter() {
        let mut store = ValueStore::new();
        let iface = |in_octets, out_octets| {
            eth0(Counters {
                in_octets: Some(in_octets),
                out_octets: Some(out_octets),
                ..Default::default()
            })
        };
        InterfaceWithRates::compute(&iface(100, 100), 0.0, &mut store, Default::default());
        let computed =
            InterfaceWithRates::compute(&iface(50, 200), 5.0, &mut store, Default::default());
        assert_eq!(computed.rates.in_octets, None);
        assert_eq!(computed.rates.out_octets, Some(RateWithAverage::new(20.0)));
        assert_eq!(computed.rate_issues.len(), 1);
        assert_eq!(computed.rate_issues[0].1.to_string(), "Value overflow");
    }

    #[test]
    fn test_precomputed_rates_bypass_counter_store() {
        let mut store = ValueStore::new();
        let iface = Interface::with_rates(
            Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
            Rates {
                in_octets: Some(12.0),
                ..Default::default()
            },
        );
        let computed = InterfaceWithRates::compute(&iface, 0.0, &mut store, Default::default());
        assert_eq!(computed.rates.in_octets, Some(RateWithAverage::new(12.0)));
        assert!(store.is_empty());
    }

    #[test]
    fn test_averages_are_stored_per_counter() {
        let mut store = ValueStore::new();
        let iface = Interface::with_rates(
            Attributes::new("1", "eth0", "eth0", OperStatus::Up).unwrap(),
            Rates {
                in_octets: Some(100.0),
                in_mcast: Some(4.0),
                ..Default::default()
            },
        );
        let averaging = AveragingParams {
            octets: Some(5),
            broadcast_multicast: None,
        };
        let computed = InterfaceWithRates::compute(&iface, 0.0, &mut store, averaging);
        let in_octets = computed.rates.in_octets.unwrap();
        assert_eq!(
            in_octets.average,
            Some(Average {
                value: 100.0,
                backlog_minutes: 5
            })
        );
        assert_eq!(computed.rates.in_mcast.unwrap().average, None);
        assert_eq!(
            store.keys().collect::<Vec<_>>(),
            vec!["in_octets.1.eth0.eth0.None.average"]
        );
    }

    #[test]
    fn test_accumulate_treats_missing_as_zero() {
        let a = RatesWithAverages {
            in_octets: Some(RateWithAverage::new(1.0)),
            ..Default::default()
        };
        let b = RatesWithAverages {
            in_octets: Some(RateWithAverage::new(2.0)),
            out_octets: Some(RateWithAverage::new(3.0)),
            ..Default::default()
        };
        let sum = a.accumulate(&b);
        assert_eq!(sum.in_octets, Some(RateWithAverage::new(3.0)));
        assert_eq!(sum.out_octets, Some(RateWithAverage::new(3.0)));
        assert_eq!(sum.in_err, None);
    }

    #[test]
    fn test_combine_drops_mismatching_averages() {
        let a = RateWithAverage {
            rate: 1.0,
            average: Some(Average {
                value: 1.0,
                backlog_minutes: 5,
            }),
        };
        let b = RateWithAverage {
            rate: 2.0,
            average: Some(Average {
                value: 2.0,
                backlog_minutes: 10,
            }),
        };
        let combined = a.combine(b);
        assert_eq!(combined.rate, 3.0);
        assert_eq!(combined.average, None);
    }
}
