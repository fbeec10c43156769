//! Read-only facade over a [`BuildingModel`]. Rules go through this layer for
//! anything that involves unit conversion, graph traversal or aggregation, so
//! each convention lives in exactly one place. Getters return `Option` for
//! anything a generated model can omit; the rules decide whether absence is a
//! finding.

use crate::core::system_type::{classify_air_system, SystemClassification};
use crate::core::units::{
    celsius_to_fahrenheit, cubic_metres_per_second_to_cfm, square_metres_to_square_feet,
    watts_to_tons,
};
use crate::input::{
    AirSystem, BuildingModel, DesignDay, Fan, PlantComponent, PlantLoop, PlantLoopType,
    PumpSpeedControl, ThermalZone,
};
use indexmap::IndexMap;

pub struct ModelFacade<'a> {
    model: &'a BuildingModel,
    /// Loop name to the deduplicated names of the zones its demand-side
    /// coils ultimately serve, resolved once up front.
    zones_served: IndexMap<&'a str, Vec<&'a str>>,
}

impl<'a> ModelFacade<'a> {
    pub fn new(model: &'a BuildingModel) -> Self {
        let zones_served = model
            .plant_loops
            .iter()
            .map(|(name, plant_loop)| (name.as_str(), zones_served_by(model, plant_loop)))
            .collect();
        Self {
            model,
            zones_served,
        }
    }

    pub fn model(&self) -> &'a BuildingModel {
        self.model
    }

    pub fn building_floor_area_ft2(&self) -> Option<f64> {
        self.model
            .building
            .floor_area_m2
            .map(square_metres_to_square_feet)
    }

    pub fn building_stories(&self) -> Option<u32> {
        self.model.building.stories
    }

    pub fn air_systems(&self) -> impl Iterator<Item = (&'a str, &'a AirSystem)> {
        self.model
            .air_systems
            .iter()
            .map(|(name, system)| (name.as_str(), system))
    }

    pub fn thermal_zones(&self) -> impl Iterator<Item = (&'a str, &'a ThermalZone)> {
        self.model
            .thermal_zones
            .iter()
            .map(|(name, zone)| (name.as_str(), zone))
    }

    pub fn zone(&self, name: &str) -> Option<&'a ThermalZone> {
        self.model.thermal_zones.get(name)
    }

    pub fn plant_loops(&self) -> impl Iterator<Item = (&'a str, &'a PlantLoop)> {
        self.model
            .plant_loops
            .iter()
            .map(|(name, plant_loop)| (name.as_str(), plant_loop))
    }

    /// Loops of a type, with service-water-heating loops filtered out: they
    /// follow their own rules and would otherwise pollute every heating-loop
    /// check.
    pub fn hvac_loops_of_type(
        &self,
        loop_type: PlantLoopType,
    ) -> impl Iterator<Item = (&'a str, &'a PlantLoop)> {
        self.plant_loops().filter(move |(name, plant_loop)| {
            plant_loop.loop_type == loop_type && !is_service_water_loop(name, plant_loop)
        })
    }

    pub fn classify_system(&self, name: &str, system: &AirSystem) -> SystemClassification {
        classify_air_system(name, system.baseline_system_type.as_deref())
    }

    /// Zones a loop's demand-side coils serve, resolved through whichever of
    /// the coil's host links the generator filled in.
    pub fn zones_served_by_loop(&self, loop_name: &str) -> &[&'a str] {
        self.zones_served
            .get(loop_name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Floor area served by a loop in ft², counting zone multipliers.
    pub fn floor_area_served_ft2(&self, loop_name: &str) -> f64 {
        self.zones_served_by_loop(loop_name)
            .iter()
            .filter_map(|zone_name| self.zone(zone_name))
            .map(|zone| square_metres_to_square_feet(zone.floor_area_m2) * zone.multiplier as f64)
            .sum()
    }

    pub fn zone_outdoor_air_cfm(&self, zone: &ThermalZone) -> Option<f64> {
        zone.minimum_outdoor_air_flow_m3_per_s
            .map(cubic_metres_per_second_to_cfm)
    }

    /// Design supply flow for a fan in cfm, falling back to the hosting
    /// system's design flow when the fan itself was not sized.
    pub fn fan_design_flow_cfm(&self, fan: &Fan, system: &AirSystem) -> Option<f64> {
        fan.design_flow_m3_per_s()
            .or(system.design_supply_air_flow_m3_per_s)
            .map(cubic_metres_per_second_to_cfm)
    }

    pub fn chillers_on(&self, plant_loop: &'a PlantLoop) -> Vec<&'a PlantComponent> {
        plant_loop
            .supply_components
            .iter()
            .filter(|c| matches!(c, PlantComponent::Chiller { .. }))
            .collect()
    }

    pub fn boilers_on(&self, plant_loop: &'a PlantLoop) -> Vec<&'a PlantComponent> {
        plant_loop
            .supply_components
            .iter()
            .filter(|c| matches!(c, PlantComponent::Boiler { .. }))
            .collect()
    }

    pub fn cooling_towers_on(&self, plant_loop: &'a PlantLoop) -> Vec<&'a PlantComponent> {
        plant_loop
            .supply_components
            .iter()
            .filter(|c| matches!(c, PlantComponent::CoolingTower { .. }))
            .collect()
    }

    pub fn pumps_on(
        &self,
        components: &'a [PlantComponent],
        speed_control: Option<PumpSpeedControl>,
    ) -> Vec<&'a PlantComponent> {
        components
            .iter()
            .filter(|c| match c {
                PlantComponent::Pump {
                    speed_control: control,
                    ..
                } => speed_control.map_or(true, |wanted| *control == wanted),
                _ => false,
            })
            .collect()
    }

    /// Total chiller capacity on a loop in tons, `None` when any chiller is
    /// missing its capacity (a partial sum would silently shift the plant
    /// into the wrong capacity band).
    pub fn total_chiller_capacity_tons(&self, plant_loop: &'a PlantLoop) -> Option<f64> {
        let chillers = self.chillers_on(plant_loop);
        if chillers.is_empty() {
            return None;
        }
        chillers
            .iter()
            .map(|chiller| match chiller {
                PlantComponent::Chiller {
                    reference_capacity_w,
                    ..
                } => reference_capacity_w.map(watts_to_tons),
                _ => None,
            })
            .sum()
    }

    /// Highest wet-bulb among the summer evaporation design days, in °F.
    pub fn evaporation_design_wet_bulb_f(&self) -> Option<f64> {
        self.model
            .design_days
            .iter()
            .filter(|day| is_evaporation_design_day(day))
            .filter_map(|day| day.wet_bulb_at_maximum_dry_bulb_c)
            .map(celsius_to_fahrenheit)
            .fold(None, |best: Option<f64>, wb| {
                Some(best.map_or(wb, |b| b.max(wb)))
            })
    }

    /// Oracle lookup into the pre-extracted simulation summary tables.
    pub fn tabular_value(
        &self,
        report: &str,
        table: &str,
        row: &str,
        column: &str,
        units: &str,
    ) -> Option<f64> {
        self.model.tabular_results.as_ref()?.iter().find_map(|r| {
            (r.report == report
                && r.table == table
                && r.row == row
                && r.column == column
                && r.units == units)
                .then_some(r.value)
        })
    }
}

pub fn is_service_water_loop(name: &str, plant_loop: &PlantLoop) -> bool {
    plant_loop.service_water_heating
        || name.contains("DHW")
        || name.contains("Service Water Heating")
}

fn is_evaporation_design_day(day: &DesignDay) -> bool {
    day.day_type == "SummerDesignDay"
        && day.name.contains("WB=>MDB")
        && day
            .humidity_indicating_type
            .as_deref()
            .is_some_and(|t| t.eq_ignore_ascii_case("Wetbulb"))
}

fn zones_served_by<'a>(model: &'a BuildingModel, plant_loop: &'a PlantLoop) -> Vec<&'a str> {
    let mut zones: Vec<&str> = Vec::new();
    let mut push = |zone_name: &'a str| {
        if !zones.contains(&zone_name) {
            zones.push(zone_name);
        }
    };
    for component in &plant_loop.demand_components {
        let PlantComponent::WaterCoil {
            air_system,
            zone,
            terminal,
            ..
        } = component
        else {
            continue;
        };
        if let Some(system_name) = air_system {
            if let Some(system) = model.air_systems.get(system_name) {
                for zone_name in &system.zones {
                    push(zone_name);
                }
            }
            continue;
        }
        if let Some(zone_name) = zone {
            push(zone_name);
            continue;
        }
        // reheat terminals reach their zone through the outlet-node port list
        if let Some(zone_name) = terminal
            .as_ref()
            .and_then(|t| t.outlet_node.as_ref())
            .and_then(|n| n.port_list.as_ref())
            .and_then(|p| p.thermal_zone.as_deref())
        {
            push(zone_name);
        }
    }
    zones
}
