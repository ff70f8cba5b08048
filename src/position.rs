//! Raw formation-position codes and the eight canonical position groups.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EfficiencyError;

/// Canonical position group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PositionGroup {
    GK,
    CB,
    FB,
    DMF,
    CMF,
    AMF,
    W,
    CF,
}

/// Group assigned to any raw code missing from [`RAW_POSITION_CODES`].
pub const FALLBACK_GROUP: PositionGroup = PositionGroup::CF;

/// Raw export codes and the group each one belongs to.
pub const RAW_POSITION_CODES: [(&str, PositionGroup); 27] = [
    ("GK", PositionGroup::GK),
    ("CB", PositionGroup::CB),
    ("LCB", PositionGroup::CB),
    ("RCB", PositionGroup::CB),
    ("LCB3", PositionGroup::CB),
    ("RCB3", PositionGroup::CB),
    ("LB", PositionGroup::FB),
    ("RB", PositionGroup::FB),
    ("LB5", PositionGroup::FB),
    ("RB5", PositionGroup::FB),
    ("LWB", PositionGroup::FB),
    ("RWB", PositionGroup::FB),
    ("DMF", PositionGroup::DMF),
    ("LDMF", PositionGroup::DMF),
    ("RDMF", PositionGroup::DMF),
    ("LCMF", PositionGroup::CMF),
    ("RCMF", PositionGroup::CMF),
    ("LCMF3", PositionGroup::CMF),
    ("RCMF3", PositionGroup::CMF),
    ("AMF", PositionGroup::AMF),
    ("LAMF", PositionGroup::AMF),
    ("RAMF", PositionGroup::AMF),
    ("LW", PositionGroup::W),
    ("RW", PositionGroup::W),
    ("LWF", PositionGroup::W),
    ("RWF", PositionGroup::W),
    ("CF", PositionGroup::CF),
];

impl PositionGroup {
    pub const ALL: [PositionGroup; 8] = [
        PositionGroup::GK,
        PositionGroup::CB,
        PositionGroup::FB,
        PositionGroup::DMF,
        PositionGroup::CMF,
        PositionGroup::AMF,
        PositionGroup::W,
        PositionGroup::CF,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PositionGroup::GK => "GK",
            PositionGroup::CB => "CB",
            PositionGroup::FB => "FB",
            PositionGroup::DMF => "DMF",
            PositionGroup::CMF => "CMF",
            PositionGroup::AMF => "AMF",
            PositionGroup::W => "W",
            PositionGroup::CF => "CF",
        }
    }

    /// Every raw code that maps onto this group.
    pub fn raw_codes(&self) -> Vec<&'static str> {
        RAW_POSITION_CODES
            .iter()
            .filter(|(_, group)| group == self)
            .map(|(code, _)| *code)
            .collect()
    }

    /// Number of K-means clusters used when the population allows it.
    pub fn cluster_count(&self) -> usize {
        match self {
            PositionGroup::GK | PositionGroup::CB | PositionGroup::FB | PositionGroup::W => 3,
            PositionGroup::DMF | PositionGroup::CMF | PositionGroup::AMF | PositionGroup::CF => 4,
        }
    }

    pub fn family(&self) -> PositionFamily {
        match self {
            PositionGroup::GK => PositionFamily::Goalkeeping,
            PositionGroup::CB | PositionGroup::FB => PositionFamily::Defensive,
            PositionGroup::DMF | PositionGroup::CMF | PositionGroup::AMF => {
                PositionFamily::Midfield
            }
            PositionGroup::W | PositionGroup::CF => PositionFamily::Attacking,
        }
    }
}

/// Coarse role family, used to describe cluster profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionFamily {
    Goalkeeping,
    Defensive,
    Midfield,
    Attacking,
}

/// Map a raw export code onto its group. Unknown codes fall back to CF.
pub fn map_to_group(raw_code: &str) -> PositionGroup {
    let code = raw_code.trim().to_ascii_uppercase();
    RAW_POSITION_CODES
        .iter()
        .find(|(raw, _)| *raw == code)
        .map(|(_, group)| *group)
        .unwrap_or(FALLBACK_GROUP)
}

impl fmt::Display for PositionGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses a group name ("FB", "w", ...). Raw codes go through [`map_to_group`].
impl FromStr for PositionGroup {
    type Err = EfficiencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        PositionGroup::ALL
            .iter()
            .find(|g| g.as_str() == wanted)
            .copied()
            .ok_or_else(|| EfficiencyError::Config(format!("Unknown position group: '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_raw_code_maps_to_its_table_group() {
        for (code, group) in RAW_POSITION_CODES {
            assert_eq!(map_to_group(code), group, "code {code}");
        }
    }

    #[test]
    fn mapping_ignores_case_and_whitespace() {
        assert_eq!(map_to_group(" lcb3 "), PositionGroup::CB);
        assert_eq!(map_to_group("rwb"), PositionGroup::FB);
    }

    #[test]
    fn unknown_codes_fall_back_to_cf() {
        assert_eq!(map_to_group("XYZ"), PositionGroup::CF);
        assert_eq!(map_to_group(""), PositionGroup::CF);
    }

    #[test]
    fn raw_codes_invert_the_mapping() {
        for group in PositionGroup::ALL {
            let codes = group.raw_codes();
            assert!(!codes.is_empty(), "{group} has no raw codes");
            assert!(codes.iter().all(|c| map_to_group(c) == group));
        }
        assert_eq!(PositionGroup::FB.raw_codes().len(), 6);
    }

    #[test]
    fn group_names_parse_round_trip() {
        for group in PositionGroup::ALL {
            assert_eq!(group.to_string().parse::<PositionGroup>().unwrap(), group);
        }
        assert!("LCB".parse::<PositionGroup>().is_err());
    }
}
