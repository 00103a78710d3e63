use std::collections::HashMap;

use super::Error;
use crate::check::State;
use crate::interface::OperStatus;

/// Per-field mapping of interface states to monitoring states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndependentMapping {
    oper: HashMap<OperStatus, State>,
    admin: HashMap<OperStatus, State>,
}

impl IndependentMapping {
    pub fn oper_state(&self, status: &OperStatus) -> Option<State> {
        self.oper.get(status).copied()
    }

    pub fn admin_state(&self, status: &OperStatus) -> Option<State> {
        self.admin.get(status).copied()
    }
}

/// Mapping of `(oper, admin)` pairs to monitoring states.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedMapping {
    table: HashMap<(OperStatus, OperStatus), State>,
}

impl CombinedMapping {
    pub fn lookup(&self, oper: &OperStatus, admin: &OperStatus) -> Option<State> {
        self.table.get(&(oper.clone(), admin.clone())).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize)]
#[serde(try_from = "StateMappingsRecord")]
pub enum StateMappings {
    Independent(IndependentMapping),
    Combined(CombinedMapping),
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "snake_case")]
enum StateMappingsRecord {
    IndependentMappings(IndependentRecord),
    CombinedMappings(Vec<(OperStatus, OperStatus, u8)>),
}

#[derive(serde::Deserialize)]
struct IndependentRecord {
    #[serde(default)]
    map_operstates: Vec<(Vec<OperStatus>, u8)>,
    #[serde(default)]
    map_admin_states: Vec<(Vec<OperStatus>, u8)>,
}

fn build_table(entries: Vec<(Vec<OperStatus>, u8)>) -> Result<HashMap<OperStatus, State>, Error> {
    let mut table = HashMap::new();
    for (statuses, mon_state) in entries {
        let state = State::try_from(mon_state)?;
        for status in statuses {
            if let Some(previous) = table.insert(status.clone(), state) {
                if previous != state {
                    return Err(Error::AmbiguousStateMapping {
                        status: status.code().to_owned(),
                        first: previous.into(),
                        second: mon_state,
                    });
                }
            }
        }
    }
    Ok(table)
}

impl TryFrom<StateMappingsRecord> for StateMappings {
    type Error = Error;

    fn try_from(record: StateMappingsRecord) -> Result<Self, Error> {
        match record {
            StateMappingsRecord::IndependentMappings(record) => {
                Ok(StateMappings::Independent(IndependentMapping {
                    oper: build_table(record.map_operstates)?,
                    admin: build_table(record.map_admin_states)?,
                }))
            }
            StateMappingsRecord::CombinedMappings(entries) => {
                let mut table = HashMap::new();
                for (oper, admin, mon_state) in entries {
                    let state = State::try_from(mon_state)?;
                    if let Some(previous) = table.insert((oper.clone(), admin.clone()), state) {
                        if previous != state {
                            return Err(Error::AmbiguousCombinedMapping {
                                oper: oper.code().to_owned(),
                                admin: admin.code().to_owned(),
                                first: previous.into(),
                                second: mon_state,
                            });
                        }
                    }
                }
                Ok(StateMappings::Combined(CombinedMapping { table }))
            }
        }
    }
}
