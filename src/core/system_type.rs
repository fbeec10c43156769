//! Baseline HVAC system types (Appendix G Table G3.1.1-3): what a model's air
//! systems declare themselves to be, and what the building's size, use and
//! climate say they should be.

use strum_macros::{Display as StrumDisplay, EnumString};

/// The baseline system families the selection table can produce, plus the
/// single-zone VAV type computer-room exceptions introduce.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, StrumDisplay, EnumString)]
pub enum BaselineSystemType {
    #[strum(serialize = "PTAC")]
    Ptac,
    #[strum(serialize = "PTHP")]
    Pthp,
    #[strum(serialize = "PSZ_AC", to_string = "PSZ-AC")]
    PszAc,
    #[strum(serialize = "PSZ_HP", to_string = "PSZ-HP")]
    PszHp,
    #[strum(serialize = "PVAV_Reheat")]
    PvavReheat,
    #[strum(serialize = "PVAV_PFP_Boxes")]
    PvavPfpBoxes,
    #[strum(serialize = "VAV_Reheat")]
    VavReheat,
    #[strum(serialize = "VAV_PFP_Boxes")]
    VavPfpBoxes,
    #[strum(serialize = "PSZ_VAV", to_string = "PSZ-VAV")]
    PszVav,
}

impl BaselineSystemType {
    /// Whether the climate-zone economizer table applies to this type at all.
    /// Packaged terminal equipment never gets one.
    pub fn economizer_eligible(&self) -> bool {
        !matches!(self, BaselineSystemType::Ptac | BaselineSystemType::Pthp)
    }

    /// Multizone VAV families whose supply-air temperature is reset by a
    /// warmest-zone setpoint manager.
    pub fn is_multizone_vav(&self) -> bool {
        matches!(
            self,
            BaselineSystemType::PvavReheat
                | BaselineSystemType::PvavPfpBoxes
                | BaselineSystemType::VavReheat
                | BaselineSystemType::VavPfpBoxes
        )
    }
}

/// Both naming conventions found on an air system: the machine-readable tag
/// and the legacy "(SysN)" name suffix. When both are present they must
/// agree; the tag wins for rule evaluation and disagreement is reported as an
/// ambiguity by the system-type rule.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SystemClassification {
    pub tagged: Option<BaselineSystemType>,
    pub from_name: Option<BaselineSystemType>,
}

impl SystemClassification {
    pub fn resolved(&self) -> Option<BaselineSystemType> {
        self.tagged.or(self.from_name)
    }

    pub fn conflicting(&self) -> bool {
        matches!((self.tagged, self.from_name), (Some(a), Some(b)) if a != b)
    }
}

pub fn classify_air_system(name: &str, tag: Option<&str>) -> SystemClassification {
    SystemClassification {
        tagged: tag.and_then(|t| t.trim().parse().ok()),
        from_name: system_type_from_name(name),
    }
}

fn system_type_from_name(name: &str) -> Option<BaselineSystemType> {
    let by_number = [
        ("(Sys1)", BaselineSystemType::Ptac),
        ("(Sys2)", BaselineSystemType::Pthp),
        ("(Sys3)", BaselineSystemType::PszAc),
        ("(Sys4)", BaselineSystemType::PszHp),
        ("(Sys5)", BaselineSystemType::PvavReheat),
        ("(Sys6)", BaselineSystemType::PvavPfpBoxes),
        ("(Sys7)", BaselineSystemType::VavReheat),
        ("(Sys8)", BaselineSystemType::VavPfpBoxes),
    ];
    for (needle, system_type) in by_number {
        if name.contains(needle) {
            return Some(system_type);
        }
    }
    // some generators name single-zone systems without the suffix
    if name.contains("PSZ-VAV") {
        Some(BaselineSystemType::PszVav)
    } else if name.contains("PSZ-AC") {
        Some(BaselineSystemType::PszAc)
    } else if name.contains("PSZ-HP") {
        Some(BaselineSystemType::PszHp)
    } else {
        None
    }
}

/// ASHRAE 169 climate zone, held as its short designation ("5B").
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClimateZone(String);

impl ClimateZone {
    /// Accepts either the bare designation or the full standard reference
    /// ("ASHRAE 169-2013-5B").
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let designation = trimmed.rsplit('-').next().unwrap_or(trimmed);
        Self(designation.to_ascii_uppercase())
    }

    pub fn designation(&self) -> &str {
        &self.0
    }

    /// Hot/humid zones where the baseline heats with electricity rather than
    /// fossil fuel.
    pub fn electric_heat(&self) -> bool {
        matches!(self.0.as_str(), "0A" | "0B" | "1A" | "1B" | "2A" | "2B" | "3A")
    }

    /// Zones where the economizer table requires one on eligible systems,
    /// with its fixed dry-bulb high limit in °F.
    pub fn economizer_high_limit_f(&self) -> Option<f64> {
        match self.0.as_str() {
            "2B" | "3B" | "3C" | "4B" | "4C" | "5B" | "5C" | "6B" => Some(75.),
            "5A" | "6A" | "7A" | "7B" | "8A" | "8B" => Some(70.),
            _ => None,
        }
    }
}

/// What the selection table keys on.
#[derive(Clone, Copy, Debug)]
pub struct SelectionInputs<'a> {
    pub climate_zone: &'a ClimateZone,
    pub residential: bool,
    pub stories: u32,
    pub floor_area_ft2: f64,
}

/// One row of the selection table: a human-readable description of when it
/// applies, the predicate itself, and the resulting type. Rows are evaluated
/// in order and the first match wins, which keeps the table auditable
/// against the standard's own wording.
pub struct SelectionRow {
    pub description: &'static str,
    pub applies: fn(&SelectionInputs) -> bool,
    pub result: BaselineSystemType,
}

pub fn selection_table() -> Vec<SelectionRow> {
    vec![
        SelectionRow {
            description: "residential, electric-heat climate",
            applies: |s| s.residential && s.climate_zone.electric_heat(),
            result: BaselineSystemType::Pthp,
        },
        SelectionRow {
            description: "residential",
            applies: |s| s.residential,
            result: BaselineSystemType::Ptac,
        },
        SelectionRow {
            description: "nonresidential, <= 3 stories and < 25,000 ft2, electric-heat climate",
            applies: |s| s.stories <= 3 && s.floor_area_ft2 < 25_000. && s.climate_zone.electric_heat(),
            result: BaselineSystemType::PszHp,
        },
        SelectionRow {
            description: "nonresidential, <= 3 stories and < 25,000 ft2",
            applies: |s| s.stories <= 3 && s.floor_area_ft2 < 25_000.,
            result: BaselineSystemType::PszAc,
        },
        SelectionRow {
            description: "nonresidential, <= 5 stories and <= 150,000 ft2, electric-heat climate",
            applies: |s| {
                s.stories <= 5 && s.floor_area_ft2 <= 150_000. && s.climate_zone.electric_heat()
            },
            result: BaselineSystemType::PvavPfpBoxes,
        },
        SelectionRow {
            description: "nonresidential, <= 5 stories and <= 150,000 ft2",
            applies: |s| s.stories <= 5 && s.floor_area_ft2 <= 150_000.,
            result: BaselineSystemType::PvavReheat,
        },
        SelectionRow {
            description: "nonresidential, > 5 stories or > 150,000 ft2, electric-heat climate",
            applies: |s| s.climate_zone.electric_heat(),
            result: BaselineSystemType::VavPfpBoxes,
        },
        SelectionRow {
            description: "nonresidential, > 5 stories or > 150,000 ft2",
            applies: |_| true,
            result: BaselineSystemType::VavReheat,
        },
    ]
}

pub fn expected_baseline_system_type(inputs: &SelectionInputs) -> BaselineSystemType {
    selection_table()
        .iter()
        .find(|row| (row.applies)(inputs))
        .map(|row| row.result)
        .unwrap_or(BaselineSystemType::VavReheat)
}
