//! Configured thresholds and their resolution into absolute values.
//!
//! Traffic levels are configured per direction as absolute values (in the configured
//! [`BandwidthUnit`] per second), as a percentage of the link speed, or as predictive
//! levels. At check time they are resolved against the reference speed of the interface;
//! all resolved traffic levels are in bytes per second.
use std::fmt;

use crate::config::Error;

/// A `(warn, crit)` pair as configured.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "(f64, f64)", into = "(f64, f64)")]
pub struct Levels {
    pub warn: f64,
    pub crit: f64,
}

impl Levels {
    pub fn new(warn: f64, crit: f64) -> Result<Self, Error> {
        if !warn.is_finite() || !crit.is_finite() {
            return Err(Error::InvalidLevels {
                warn,
                crit,
                reason: "levels must be finite",
            });
        }
        Ok(Self { warn, crit })
    }

    fn check_order(self, bound: Bound) -> Result<Self, Error> {
        let ordered = match bound {
            Bound::Upper => self.warn <= self.crit,
            Bound::Lower => self.warn >= self.crit,
        };
        if ordered {
            Ok(self)
        } else {
            Err(Error::InvalidLevels {
                warn: self.warn,
                crit: self.crit,
                reason: match bound {
                    Bound::Upper => "warning level is above critical level",
                    Bound::Lower => "warning level is below critical level",
                },
            })
        }
    }

    fn scaled(self, factor: f64) -> Thresholds {
        (self.warn * factor, self.crit * factor)
    }
}

impl TryFrom<(f64, f64)> for Levels {
    type Error = Error;

    fn try_from((warn, crit): (f64, f64)) -> Result<Self, Error> {
        Levels::new(warn, crit)
    }
}

impl From<Levels> for (f64, f64) {
    fn from(levels: Levels) -> Self {
        (levels.warn, levels.crit)
    }
}

/// Upper levels; the warning level must not exceed the critical level.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Levels", into = "Levels")]
pub struct UpperLevels(Levels);

impl UpperLevels {
    pub fn new(warn: f64, crit: f64) -> Result<Self, Error> {
        Levels::new(warn, crit)?.try_into()
    }

    pub fn levels(self) -> Levels {
        self.0
    }
}

impl TryFrom<Levels> for UpperLevels {
    type Error = Error;

    fn try_from(levels: Levels) -> Result<Self, Error> {
        levels.check_order(Bound::Upper).map(UpperLevels)
    }
}

impl From<UpperLevels> for Levels {
    fn from(levels: UpperLevels) -> Self {
        levels.0
    }
}

/// Resolved absolute `(warn, crit)` thresholds.
pub type Thresholds = (f64, f64);

/// Unit traffic levels are configured in and traffic is displayed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BandwidthUnit {
    #[default]
    Byte,
    #[serde(alias = "Bit")]
    Bit,
}

impl BandwidthUnit {
    /// Number of these units per byte.
    pub fn per_byte(self) -> f64 {
        match self {
            BandwidthUnit::Byte => 1.0,
            BandwidthUnit::Bit => 8.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bound {
    #[default]
    Upper,
    Lower,
}

/// Direction a traffic rule applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrafficDirection {
    In,
    Out,
    Both,
    Total,
}

impl TrafficDirection {
    pub fn name(self) -> &'static str {
        match self {
            TrafficDirection::In => "in",
            TrafficDirection::Out => "out",
            TrafficDirection::Both => "both",
            TrafficDirection::Total => "total",
        }
    }

    fn directions(self) -> &'static [Direction] {
        match self {
            TrafficDirection::In => &[Direction::In],
            TrafficDirection::Out => &[Direction::Out],
            TrafficDirection::Both => &[Direction::In, Direction::Out],
            TrafficDirection::Total => &[Direction::Total],
        }
    }
}

/// Direction of a checked rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    In,
    Out,
    Total,
}

impl Direction {
    pub fn name(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "out",
            Direction::Total => "total",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Direction::In => "In",
            Direction::Out => "Out",
            Direction::Total => "Total",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Abs,
    Perc,
}

/// Levels of one traffic rule.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase", try_from = "TrafficLevelsRecord")]
pub enum TrafficLevels {
    Abs {
        #[serde(default)]
        bound: Bound,
        levels: Levels,
    },
    Perc {
        #[serde(default)]
        bound: Bound,
        levels: Levels,
    },
    /// Opaque configuration handed to the predictive comparator.
    Predictive { config: serde_json::Value },
}

#[derive(serde::Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum TrafficLevelsRecord {
    Abs {
        #[serde(default)]
        bound: Bound,
        levels: Levels,
    },
    Perc {
        #[serde(default)]
        bound: Bound,
        levels: Levels,
    },
    Predictive {
        config: serde_json::Value,
    },
}

impl TryFrom<TrafficLevelsRecord> for TrafficLevels {
    type Error = Error;

    fn try_from(record: TrafficLevelsRecord) -> Result<Self, Error> {
        Ok(match record {
            TrafficLevelsRecord::Abs { bound, levels } => TrafficLevels::Abs {
                bound,
                levels: levels.check_order(bound)?,
            },
            TrafficLevelsRecord::Perc { bound, levels } => TrafficLevels::Perc {
                bound,
                levels: levels.check_order(bound)?,
            },
            TrafficLevelsRecord::Predictive { config } => TrafficLevels::Predictive { config },
        })
    }
}

/// A traffic rule: levels plus the direction they apply to.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TrafficRule {
    pub direction: TrafficDirection,
    #[serde(flatten)]
    pub levels: TrafficLevels,
}

/// Resolved levels of one direction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedLevels {
    pub upper: Option<Thresholds>,
    pub lower: Option<Thresholds>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DirectionLevels {
    Fixed(FixedLevels),
    Predictive(serde_json::Value),
}

impl Default for DirectionLevels {
    fn default() -> Self {
        DirectionLevels::Fixed(FixedLevels::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BandwidthLevels {
    pub input: DirectionLevels,
    pub output: DirectionLevels,
    pub total: DirectionLevels,
}

impl BandwidthLevels {
    pub fn get(&self, direction: Direction) -> &DirectionLevels {
        match direction {
            Direction::In => &self.input,
            Direction::Out => &self.output,
            Direction::Total => &self.total,
        }
    }

    fn get_mut(&mut self, direction: Direction) -> &mut DirectionLevels {
        match direction {
            Direction::In => &mut self.input,
            Direction::Out => &mut self.output,
            Direction::Total => &mut self.total,
        }
    }
}

/// Reference speeds in bytes per second, `None` where unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReferenceSpeeds {
    pub input: Option<f64>,
    pub output: Option<f64>,
    pub total: Option<f64>,
}

impl ReferenceSpeeds {
    /// The total speed is only known if both directions are.
    pub fn new(input: Option<f64>, output: Option<f64>) -> Self {
        let total = match (input, output) {
            (Some(input), Some(output)) => Some(input + output),
            _ => None,
        };
        Self {
            input,
            output,
            total,
        }
    }

    pub fn get(&self, direction: Direction) -> Option<f64> {
        match direction {
            Direction::In => self.input,
            Direction::Out => self.output,
            Direction::Total => self.total,
        }
    }
}

/// Resolves configured levels into absolute byte thresholds.
///
/// Absolute levels are converted from `unit` to bytes. Percent levels are relative to
/// `reference_speed` and resolve to `None` when the speed is unknown or zero.
///
/// # Example
/// ```
/// use ifmon::levels::{resolve, BandwidthUnit, LevelKind, Levels};
///
/// let levels = Levels::new(5.0, 20.0).unwrap();
/// assert_eq!(
///     resolve(LevelKind::Perc, levels, Some(125_000_000.0), BandwidthUnit::Byte),
///     Some((6_250_000.0, 25_000_000.0))
/// );
/// assert_eq!(resolve(LevelKind::Perc, levels, None, BandwidthUnit::Byte), None);
/// ```
pub fn resolve(
    kind: LevelKind,
    levels: Levels,
    reference_speed: Option<f64>,
    unit: BandwidthUnit,
) -> Option<Thresholds> {
    match kind {
        LevelKind::Abs => Some(levels.scaled(1.0 / unit.per_byte())),
        LevelKind::Perc => reference_speed
            .filter(|speed| *speed > 0.0)
            .map(|speed| levels.scaled(speed / 100.0)),
    }
}

/// Merges the traffic rules into per-direction levels.
///
/// Later rules override earlier ones for the same direction and bound. Predictive levels
/// replace any fixed levels of their direction, and fixed levels configured afterwards
/// replace predictive ones.
pub fn bandwidth_levels<'a>(
    rules: impl IntoIterator<Item = (TrafficDirection, &'a TrafficLevels)>,
    speeds: ReferenceSpeeds,
    unit: BandwidthUnit,
) -> BandwidthLevels {
    let mut merged = BandwidthLevels::default();
    for (rule_direction, levels) in rules {
        for &direction in rule_direction.directions() {
            let slot = merged.get_mut(direction);
            let (kind, bound, levels) = match levels {
                TrafficLevels::Predictive { config } => {
                    *slot = DirectionLevels::Predictive(config.clone());
                    continue;
                }
                TrafficLevels::Abs { bound, levels } => (LevelKind::Abs, *bound, *levels),
                TrafficLevels::Perc { bound, levels } => (LevelKind::Perc, *bound, *levels),
            };
            if matches!(slot, DirectionLevels::Predictive(_)) {
                *slot = DirectionLevels::default();
            }
            if let DirectionLevels::Fixed(fixed) = slot {
                let resolved = resolve(kind, levels, speeds.get(direction), unit);
                match bound {
                    Bound::Upper => fixed.upper = resolved,
                    Bound::Lower => fixed.lower = resolved,
                }
            }
        }
    }
    merged
}

/// Packet levels, absolute in packets per second or as percentage of a reference rate.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", content = "levels", rename_all = "lowercase")]
pub enum PacketLevel {
    Abs(UpperLevels),
    Perc(UpperLevels),
}

/// Packet levels per direction. Direction specific levels take precedence over `both`.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DirectionalPacketLevels {
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub input: Option<PacketLevel>,
    #[serde(rename = "out", skip_serializing_if = "Option::is_none")]
    pub output: Option<PacketLevel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub both: Option<PacketLevel>,
}

impl DirectionalPacketLevels {
    /// Error levels applied when none are configured: 0.01% warn, 0.1% crit.
    pub fn default_errors() -> Self {
        Self {
            both: Some(PacketLevel::Perc(UpperLevels(Levels {
                warn: 0.01,
                crit: 0.1,
            }))),
            ..Default::default()
        }
    }

    pub fn for_direction(&self, direction: Direction) -> Option<PacketLevel> {
        match direction {
            Direction::In => self.input.or(self.both),
            Direction::Out => self.output.or(self.both),
            Direction::Total => self.both,
        }
    }
}

/// Resolves packet levels against `reference_rate` (packets per second).
///
/// Percent levels resolve to `None` if the reference rate is unknown or zero.
pub fn resolve_packet_levels(level: PacketLevel, reference_rate: Option<f64>) -> Option<Thresholds> {
    match level {
        PacketLevel::Abs(levels) => Some(levels.levels().scaled(1.0)),
        PacketLevel::Perc(levels) => reference_rate
            .filter(|rate| *rate > 0.0)
            .map(|rate| levels.levels().scaled(rate / 100.0)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(json: &str) -> TrafficRule {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_percent_levels_resolve_against_speed() {
        let levels = Levels::new(5.0, 20.0).unwrap();
        assert_eq!(
            resolve(LevelKind::Perc, levels, Some(125_000_000.0), BandwidthUnit::Byte),
            Some((6_250_000.0, 25_000_000.0))
        );
        assert_eq!(resolve(LevelKind::Perc, levels, Some(0.0), BandwidthUnit::Byte), None);
    }

    #[test]
    fn test_absolute_bit_levels_are_converted_to_bytes() {
        let levels = Levels::new(800.0, 1600.0).unwrap();
        assert_eq!(
            resolve(LevelKind::Abs, levels, None, BandwidthUnit::Bit),
            Some((100.0, 200.0))
        );
        assert_eq!(
            resolve(LevelKind::Abs, levels, None, BandwidthUnit::Byte),
            Some((800.0, 1600.0))
        );
    }

    #[test]
    fn test_bandwidth_levels_merge_rules() {
        let rules = [
            rule(r#"{"direction": "both", "kind": "perc", "levels": [50, 80]}"#),
            rule(r#"{"direction": "in", "kind": "abs", "bound": "lower", "levels": [10, 5]}"#),
            rule(r#"{"direction": "total", "kind": "abs", "levels": [100, 200]}"#),
        ];
        let speeds = ReferenceSpeeds::new(Some(1000.0), None);
        let merged = bandwidth_levels(
            rules.iter().map(|r| (r.direction, &r.levels)),
            speeds,
            BandwidthUnit::Byte,
        );
        assert_eq!(
            merged.input,
            DirectionLevels::Fixed(FixedLevels {
                upper: Some((500.0, 800.0)),
                lower: Some((10.0, 5.0)),
            })
        );
        assert_eq!(
            merged.output,
            DirectionLevels::Fixed(FixedLevels::default()),
            "percent levels without speed resolve to no levels"
        );
        assert_eq!(
            merged.total,
            DirectionLevels::Fixed(FixedLevels {
                upper: Some((100.0, 200.0)),
                lower: None,
            })
        );
    }

    #[test]
    fn test_predictive_replaces_fixed_levels() {
        let rules = [
            rule(r#"{"direction": "out", "kind": "abs", "levels": [1, 2]}"#),
            rule(r#"{"direction": "out", "kind": "predictive", "config": {"horizon": 90}}"#),
        ];
        let merged = bandwidth_levels(
            rules.iter().map(|r| (r.direction, &r.levels)),
            ReferenceSpeeds::default(),
            BandwidthUnit::Byte,
        );
        assert_eq!(
            merged.output,
            DirectionLevels::Predictive(serde_json::json!({"horizon": 90}))
        );
        assert_eq!(merged.input, DirectionLevels::default());
    }

    #[test]
    fn test_reference_speed_total_requires_both() {
        assert_eq!(ReferenceSpeeds::new(Some(1.0), None).total, None);
        assert_eq!(ReferenceSpeeds::new(Some(1.0), Some(2.0)).total, Some(3.0));
    }

    #[test]
    fn test_inverted_levels_are_rejected() {
        let err = serde_json::from_str::<TrafficRule>(
            r#"{"direction": "in", "kind": "abs", "levels": [20, 10]}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("warning level is above critical level"));

        assert!(
            serde_json::from_str::<TrafficRule>(
                r#"{"direction": "in", "kind": "abs", "bound": "lower", "levels": [5, 10]}"#,
            )
            .is_err()
        );
        assert!(serde_json::from_str::<PacketLevel>(r#"{"kind": "perc", "levels": [2, 1]}"#).is_err());
    }

    #[test]
    fn test_packet_levels() {
        let levels: DirectionalPacketLevels = serde_json::from_str(
            r#"{"both": {"kind": "perc", "levels": [0.01, 0.1]}, "out": {"kind": "abs", "levels": [10, 20]}}"#,
        )
        .unwrap();
        let input = levels.for_direction(Direction::In).unwrap();
        assert_eq!(input, PacketLevel::Perc(UpperLevels::new(0.01, 0.1).unwrap()));
        assert_eq!(resolve_packet_levels(input, Some(1000.0)), Some((0.1, 1.0)));
        assert_eq!(resolve_packet_levels(input, Some(0.0)), None);
        assert_eq!(
            resolve_packet_levels(levels.for_direction(Direction::Out).unwrap(), None),
            Some((10.0, 20.0))
        );
    }
}
