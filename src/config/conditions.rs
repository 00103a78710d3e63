use regex::Regex;

use super::Error;
use crate::interface::{Attributes, OperStatus};

/// Regular expressions matched against the start of a string.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct PatternList {
    patterns: Vec<String>,
    regexes: Vec<Regex>,
}

impl PatternList {
    /// Compiles `patterns`. Each pattern is anchored at the start of the subject only.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegex`] for the first pattern that does not compile.
    pub fn new<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Result<Self, Error> {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let regexes = patterns
            .iter()
            .map(|pattern| {
                Regex::new(&format!("^(?:{pattern})")).map_err(|err| Error::InvalidRegex {
                    pattern: pattern.clone(),
                    reason: err.to_string(),
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { patterns, regexes })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_match(&self, subject: &str) -> bool {
        self.regexes.iter().any(|regex| regex.is_match(subject))
    }
}

impl PartialEq for PatternList {
    fn eq(&self, other: &Self) -> bool {
        self.patterns == other.patterns
    }
}

impl TryFrom<Vec<String>> for PatternList {
    type Error = Error;

    fn try_from(patterns: Vec<String>) -> Result<Self, Error> {
        PatternList::new(patterns)
    }
}

impl From<PatternList> for Vec<String> {
    fn from(list: PatternList) -> Self {
        list.patterns
    }
}

/// Filters over interface attributes. An absent filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MatchingConditions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_index: Option<PatternList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_alias: Option<PatternList>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub match_desc: Option<PatternList>,
    /// Port type codes. Interfaces without a port type always pass this filter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub porttypes: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portstates: Option<Vec<OperStatus>>,
    /// Admin states. Interfaces that do not report an admin state always pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_states: Option<Vec<OperStatus>>,
}

impl MatchingConditions {
    /// Conditions matching every interface.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn matches(&self, attributes: &Attributes) -> bool {
        let pattern_matches =
            |list: &Option<PatternList>, subject: &str| list.as_ref().is_none_or(|l| l.is_match(subject));

        pattern_matches(&self.match_index, &attributes.index)
            && pattern_matches(&self.match_alias, &attributes.alias)
            && pattern_matches(&self.match_desc, &attributes.descr)
            && self.porttypes.as_ref().is_none_or(|types| {
                attributes.port_type.is_empty() || types.contains(&attributes.port_type)
            })
            && self
                .portstates
                .as_ref()
                .is_none_or(|states| states.contains(&attributes.oper_status))
            && self.admin_states.as_ref().is_none_or(|states| {
                attributes
                    .admin_status
                    .as_ref()
                    .is_none_or(|admin| states.contains(admin))
            })
    }
}
