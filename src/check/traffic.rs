use super::{CheckEntry, CheckResult, Metric, PredictiveComparator, check_levels};
use crate::config::{self, CheckParams};
use crate::levels::{
    self, BandwidthLevels, BandwidthUnit, Direction, DirectionLevels, DirectionalPacketLevels,
    PacketLevel, ReferenceSpeeds, UpperLevels,
};
use crate::rates::{RateWithAverage, RatesWithAverages};
use crate::render;

/// Everything the bandwidth check needs besides the rates. Speeds are in bytes per
/// second.
pub(super) struct Bandwidth<'a> {
    pub speeds: ReferenceSpeeds,
    pub levels: BandwidthLevels,
    pub unit: BandwidthUnit,
    /// Whether an assumed speed is configured for either direction.
    pub assumed_speed: bool,
    pub monitor_total: bool,
    pub comparator: Option<&'a dyn PredictiveComparator>,
}

impl Bandwidth<'_> {
    fn renderer(&self) -> fn(f64) -> String {
        match self.unit {
            BandwidthUnit::Bit => render::nicspeed,
            BandwidthUnit::Byte => render::iobandwidth,
        }
    }

    pub(super) fn check(
        &self,
        rates: &RatesWithAverages,
        entries: &mut Vec<CheckEntry>,
    ) -> config::Result<()> {
        let mut directions = vec![
            (Direction::In, rates.in_octets),
            (Direction::Out, rates.out_octets),
        ];
        if self.monitor_total {
            directions.push((Direction::Total, rates.total_octets));
        }
        for (direction, traffic) in directions {
            if let Some(traffic) = traffic {
                self.check_direction(direction, traffic, entries)?;
            }
        }
        Ok(())
    }

    fn check_direction(
        &self,
        direction: Direction,
        traffic: RateWithAverage,
        entries: &mut Vec<CheckEntry>,
    ) -> config::Result<()> {
        let render = self.renderer();
        let speed = self.speeds.get(direction);
        let value = traffic.filtered();
        let title = match traffic.average {
            Some(average) => format!(
                "{} average {}min",
                direction.title(),
                average.backlog_minutes
            ),
            None => direction.title().to_owned(),
        };

        let (result, upper) = match self.levels.get(direction) {
            DirectionLevels::Fixed(fixed) => {
                let (state, text) = check_levels(value, fixed.upper, fixed.lower, render, &title);
                (CheckResult::summary(state, text), fixed.upper)
            }
            DirectionLevels::Predictive(predictive) => {
                let comparator =
                    self.comparator
                        .ok_or_else(|| config::Error::PredictiveWithoutComparator {
                            direction: direction.name().to_owned(),
                        })?;
                let metric_name = match traffic.average {
                    Some(average) => format!("{}_avg_{}", direction.name(), average.backlog_minutes),
                    None => direction.name().to_owned(),
                };
                let outcome = comparator.compare(value, predictive, &metric_name, &title, render);
                // The averaged metric is kept for future predictions.
                if traffic.average.is_some() {
                    entries.push(outcome.metric.into());
                }
                entries.extend(outcome.reference_curve.into_iter().map(CheckEntry::from));
                (outcome.result, None)
            }
        };

        match speed.filter(|speed| *speed != 0.0) {
            Some(speed) => {
                let mut percent = render::percent(100.0 * value / speed);
                if self.assumed_speed {
                    percent = format!("{percent}/{}", render(speed));
                }
                entries.push(
                    CheckResult {
                        text: format!("{} ({percent})", result.text),
                        ..result
                    }
                    .into(),
                );
            }
            None => entries.push(result.into()),
        }

        // Graphs show the raw rate, not the average.
        entries.push(
            Metric::new(direction.name(), traffic.rate)
                .with_levels(upper)
                .with_boundaries(Some(0.0), speed)
                .into(),
        );
        Ok(())
    }
}

/// Sum of the rates, unknown if any of them is.
fn sum_rates(rates: &[Option<RateWithAverage>]) -> Option<f64> {
    rates.iter().try_fold(0.0, |sum, rate| Some(sum + rate.as_ref()?.rate))
}

struct PacketRate<'a> {
    rate: RateWithAverage,
    level: Option<PacketLevel>,
    title: &'a str,
    metric: &'a str,
    /// Percent levels are relative to this rate.
    reference: Option<f64>,
}

/// Error, discard, multicast, broadcast, unicast and non-unicast packet rates.
pub(super) fn check_packets(
    rates: &RatesWithAverages,
    params: &CheckParams,
    entries: &mut Vec<CheckEntry>,
) {
    for direction in [Direction::In, Direction::Out] {
        let (ucast, mcast, bcast, nucast, disc, err) = match direction {
            Direction::In => (
                rates.in_ucast,
                rates.in_mcast,
                rates.in_bcast,
                rates.in_nucast,
                rates.in_disc,
                rates.in_err,
            ),
            _ => (
                rates.out_ucast,
                rates.out_mcast,
                rates.out_bcast,
                rates.out_nucast,
                rates.out_disc,
                rates.out_err,
            ),
        };
        let successful = sum_rates(&[ucast, nucast]);
        let level = |configured: &Option<DirectionalPacketLevels>| {
            configured
                .as_ref()
                .and_then(|configured| configured.for_direction(direction))
        };

        let packet_rates = [
            (err, &params.errors, "Errors", "err", sum_rates(&[ucast, nucast, err])),
            (disc, &params.discards, "Discards", "disc", sum_rates(&[ucast, nucast, disc])),
            (mcast, &params.multicast, "Multicast", "mcast", successful),
            (bcast, &params.broadcast, "Broadcast", "bcast", successful),
            (ucast, &params.unicast, "Unicast", "ucast", successful),
        ];
        for (rate, levels, title, metric, reference) in packet_rates {
            let Some(rate) = rate else {
                continue;
            };
            check_packet_rate(
                direction,
                PacketRate {
                    rate,
                    level: level(levels),
                    title,
                    metric,
                    reference,
                },
                entries,
            );
        }

        if let Some(nucast) = nucast {
            let upper = params.nucasts.map(|levels| {
                let levels = levels.levels();
                (levels.warn, levels.crit)
            });
            let (state, text) = check_levels(
                nucast.rate,
                upper,
                None,
                render::packets_per_second,
                &format!("Non-unicast {direction}"),
            );
            entries.push(CheckResult::notice(state, text).into());
            entries.push(
                Metric::new(format!("{direction}nucast"), nucast.rate)
                    .with_levels(upper)
                    .into(),
            );
        }
    }
}

fn check_packet_rate(direction: Direction, packets: PacketRate<'_>, entries: &mut Vec<CheckEntry>) {
    let mut label = format!("{} {direction}", packets.title);
    if let Some(average) = packets.rate.average {
        label.push_str(&format!(" average {}min", average.backlog_minutes));
    }
    let value = packets.rate.filtered();
    let thresholds = |levels: UpperLevels| {
        let levels = levels.levels();
        (levels.warn, levels.crit)
    };

    let (state, text, merged) = match packets.level {
        Some(level @ PacketLevel::Perc(levels)) => {
            // Percent levels need a reference rate.
            let Some(reference) = packets.reference else {
                return;
            };
            let percentage = if reference == 0.0 {
                0.0
            } else {
                value * 100.0 / reference
            };
            let (state, text) = check_levels(
                percentage,
                Some(thresholds(levels)),
                None,
                render::packet_percent,
                &label,
            );
            (state, text, levels::resolve_packet_levels(level, Some(reference)))
        }
        Some(level @ PacketLevel::Abs(levels)) => {
            let (state, text) = check_levels(
                value,
                Some(thresholds(levels)),
                None,
                render::packets_per_second,
                &label,
            );
            (state, text, levels::resolve_packet_levels(level, None))
        }
        None => {
            let (state, text) =
                check_levels(value, None, None, render::packets_per_second, &label);
            (state, text, None)
        }
    };

    entries.push(CheckResult::notice(state, text).into());
    entries.push(
        Metric::new(format!("{direction}{}", packets.metric), packets.rate.rate)
            .with_levels(merged)
            .into(),
    );
}
