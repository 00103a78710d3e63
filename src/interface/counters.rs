use std::fmt;

/// One of the twelve traffic dimensions reported per interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterKind {
    InOctets,
    InUcast,
    InMcast,
    InBcast,
    InDisc,
    InErr,
    OutOctets,
    OutUcast,
    OutMcast,
    OutBcast,
    OutDisc,
    OutErr,
}

impl CounterKind {
    /// All counters, in the order rates are computed and reported.
    pub const ALL: [CounterKind; 12] = [
        CounterKind::InOctets,
        CounterKind::InUcast,
        CounterKind::InMcast,
        CounterKind::InBcast,
        CounterKind::InDisc,
        CounterKind::InErr,
        CounterKind::OutOctets,
        CounterKind::OutUcast,
        CounterKind::OutMcast,
        CounterKind::OutBcast,
        CounterKind::OutDisc,
        CounterKind::OutErr,
    ];

    /// The metric part of the value store key, e.g. `in_octets`.
    pub fn name(self) -> &'static str {
        match self {
            CounterKind::InOctets => "in_octets",
            CounterKind::InUcast => "in_ucast",
            CounterKind::InMcast => "in_mcast",
            CounterKind::InBcast => "in_bcast",
            CounterKind::InDisc => "in_disc",
            CounterKind::InErr => "in_err",
            CounterKind::OutOctets => "out_octets",
            CounterKind::OutUcast => "out_ucast",
            CounterKind::OutMcast => "out_mcast",
            CounterKind::OutBcast => "out_bcast",
            CounterKind::OutDisc => "out_disc",
            CounterKind::OutErr => "out_err",
        }
    }
}

impl fmt::Display for CounterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Raw, monotonically increasing hardware counters. `None` means the device does not
/// report that counter.
#[derive(Debug, Clone, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Counters {
    pub in_octets: Option<u64>,
    pub in_ucast: Option<u64>,
    pub in_mcast: Option<u64>,
    pub in_bcast: Option<u64>,
    pub in_disc: Option<u64>,
    pub in_err: Option<u64>,
    pub out_octets: Option<u64>,
    pub out_ucast: Option<u64>,
    pub out_mcast: Option<u64>,
    pub out_bcast: Option<u64>,
    pub out_disc: Option<u64>,
    pub out_err: Option<u64>,
}

impl Counters {
    pub fn get(&self, kind: CounterKind) -> Option<u64> {
        match kind {
            CounterKind::InOctets => self.in_octets,
            CounterKind::InUcast => self.in_ucast,
            CounterKind::InMcast => self.in_mcast,
            CounterKind::InBcast => self.in_bcast,
            CounterKind::InDisc => self.in_disc,
            CounterKind::InErr => self.in_err,
            CounterKind::OutOctets => self.out_octets,
            CounterKind::OutUcast => self.out_ucast,
            CounterKind::OutMcast => self.out_mcast,
            CounterKind::OutBcast => self.out_bcast,
            CounterKind::OutDisc => self.out_disc,
            CounterKind::OutErr => self.out_err,
        }
    }

    pub fn get_mut(&mut self, kind: CounterKind) -> &mut Option<u64> {
        match kind {
            CounterKind::InOctets => &mut self.in_octets,
            CounterKind::InUcast => &mut self.in_ucast,
            CounterKind::InMcast => &mut self.in_mcast,
            CounterKind::InBcast => &mut self.in_bcast,
            CounterKind::InDisc => &mut self.in_disc,
            CounterKind::InErr => &mut self.in_err,
            CounterKind::OutOctets => &mut self.out_octets,
            CounterKind::OutUcast => &mut self.out_ucast,
            CounterKind::OutMcast => &mut self.out_mcast,
            CounterKind::OutBcast => &mut self.out_bcast,
            CounterKind::OutDisc => &mut self.out_disc,
            CounterKind::OutErr => &mut self.out_err,
        }
    }
}

impl std::ops::AddAssign<&Counters> for Counters {
    fn add_assign(&mut self, rhs: &Counters) {
        for kind in CounterKind::ALL {
            let lhs = self.get_mut(kind);
            *lhs = match (*lhs, rhs.get(kind)) {
                (Some(a), Some(b)) => Some(a.saturating_add(b)),
                (a, b) => a.or(b),
            };
        }
    }
}

/// Per-second rates. `None` means the rate is not computable this cycle.
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Rates {
    pub in_octets: Option<f64>,
    pub in_ucast: Option<f64>,
    pub in_mcast: Option<f64>,
    pub in_bcast: Option<f64>,
    pub in_disc: Option<f64>,
    pub in_err: Option<f64>,
    pub out_octets: Option<f64>,
    pub out_ucast: Option<f64>,
    pub out_mcast: Option<f64>,
    pub out_bcast: Option<f64>,
    pub out_disc: Option<f64>,
    pub out_err: Option<f64>,
}

impl Rates {
    pub fn get(&self, kind: CounterKind) -> Option<f64> {
        match kind {
            CounterKind::InOctets => self.in_octets,
            CounterKind::InUcast => self.in_ucast,
            CounterKind::InMcast => self.in_mcast,
            CounterKind::InBcast => self.in_bcast,
            CounterKind::InDisc => self.in_disc,
            CounterKind::InErr => self.in_err,
            CounterKind::OutOctets => self.out_octets,
            CounterKind::OutUcast => self.out_ucast,
            CounterKind::OutMcast => self.out_mcast,
            CounterKind::OutBcast => self.out_bcast,
            CounterKind::OutDisc => self.out_disc,
            CounterKind::OutErr => self.out_err,
        }
    }

    pub fn set(&mut self, kind: CounterKind, rate: Option<f64>) {
        let slot = match kind {
            CounterKind::InOctets => &mut self.in_octets,
            CounterKind::InUcast => &mut self.in_ucast,
            CounterKind::InMcast => &mut self.in_mcast,
            CounterKind::InBcast => &mut self.in_bcast,
            CounterKind::InDisc => &mut self.in_disc,
            CounterKind::InErr => &mut self.in_err,
            CounterKind::OutOctets => &mut self.out_octets,
            CounterKind::OutUcast => &mut self.out_ucast,
            CounterKind::OutMcast => &mut self.out_mcast,
            CounterKind::OutBcast => &mut self.out_bcast,
            CounterKind::OutDisc => &mut self.out_disc,
            CounterKind::OutErr => &mut self.out_err,
        };
        *slot = rate;
    }

    /// `in_octets + out_octets`, only when both are present.
    pub fn total_octets(&self) -> Option<f64> {
        Some(self.in_octets? + self.out_octets?)
    }
}

impl std::ops::AddAssign<&Rates> for Rates {
    fn add_assign(&mut self, rhs: &Rates) {
        for kind in CounterKind::ALL {
            let sum = match (self.get(kind), rhs.get(kind)) {
                (Some(a), Some(b)) => Some(a + b),
                (a, b) => a.or(b),
            };
            self.set(kind, sum);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assign_sums_present_counters() {
        let mut total = Counters {
            in_octets: Some(100),
            out_octets: Some(10),
            ..Default::default()
        };
        total += &Counters {
            in_octets: Some(23),
            in_err: Some(1),
            ..Default::default()
        };
        assert_eq!(total.in_octets, Some(123));
        assert_eq!(total.out_octets, Some(10));
        assert_eq!(total.in_err, Some(1));
        assert_eq!(total.out_err, None);
    }

    #[test]
    fn test_add_assign_saturates() {
        let mut total = Counters {
            in_octets: Some(u64::MAX - 1),
            ..Default::default()
        };
        total += &Counters {
            in_octets: Some(5),
            ..Default::default()
        };
        assert_eq!(total.in_octets, Some(u64::MAX));
    }

    #[test]
    fn test_add_assign_rates() {
        let mut total = Rates {
            in_octets: Some(1.5),
            ..Default::default()
        };
        total += &Rates {
            in_octets: Some(0.5),
            out_err: Some(2.0),
            ..Default::default()
        };
        assert_eq!(total.in_octets, Some(2.0));
        assert_eq!(total.out_err, Some(2.0));
        assert_eq!(total.out_octets, None);
    }

    #[test]
    fn test_total_octets_requires_both_directions() {
        let mut rates = Rates::default();
        rates.set(CounterKind::InOctets, Some(1.5));
        assert_eq!(rates.total_octets(), None);
        rates.set(CounterKind::OutOctets, Some(2.0));
        assert_eq!(rates.total_octets(), Some(3.5));
    }

    #[test]
    fn test_counter_names_are_unique() {
        let names: std::collections::HashSet<_> =
            CounterKind::ALL.iter().map(|k| k.name()).collect();
        assert_eq!(names.len(), CounterKind::ALL.len());
    }
}
