//! Assemblies: validated geometry plus resolved materials and correlations.

use std::sync::Arc;

use bf_core::AsmId;
use bf_correlations::{CorrelationNames, CorrelationSet};
use bf_geometry::{AssemblyGeometry, FuelModel, Hex, PinInternals};
use bf_materials::{Material, MaterialLibrary, Phase};

use crate::error::{ConfigError, ConfigResult};
use crate::hotspot::HotspotFactors;

/// Materials of the pin interior.
#[derive(Debug, Clone)]
pub enum PinMaterials {
    Fuel {
        model: FuelModel,
        fuel: Arc<Material>,
        bond: Arc<Material>,
    },
    /// Outer radius fraction and material of each zone, innermost first.
    Zones(Vec<(f64, Arc<Material>)>),
}

#[derive(Debug, Clone)]
pub struct AssemblyMaterials {
    pub coolant: Arc<Material>,
    pub duct: Arc<Material>,
    pub clad: Arc<Material>,
    pub pin: Option<PinMaterials>,
}

/// One assembly of the core, immutable during a solve.
#[derive(Debug, Clone)]
pub struct Assembly {
    id: AsmId,
    name: String,
    position: Hex,
    geometry: AssemblyGeometry,
    materials: AssemblyMaterials,
    correlations: CorrelationSet,
    hotspot: Option<HotspotFactors>,
    flow_rate: f64,
}

impl Assembly {
    pub fn builder(name: impl Into<String>, position: Hex, geometry: AssemblyGeometry) -> AssemblyBuilder {
        AssemblyBuilder {
            name: name.into(),
            position,
            geometry,
            coolant: "sodium".to_string(),
            duct: "ht9".to_string(),
            clad: "ht9".to_string(),
            correlations: CorrelationNames::default(),
            hotspot: None,
        }
    }

    /// Slot in the core; the first slot until the core is built.
    pub fn id(&self) -> AsmId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn position(&self) -> Hex {
        self.position
    }

    pub fn geometry(&self) -> &AssemblyGeometry {
        &self.geometry
    }

    pub fn materials(&self) -> &AssemblyMaterials {
        &self.materials
    }

    pub fn correlations(&self) -> &CorrelationSet {
        &self.correlations
    }

    pub fn hotspot(&self) -> Option<&HotspotFactors> {
        self.hotspot.as_ref()
    }

    /// Coolant mass flow rate [kg/s]; zero until assigned by the core.
    pub fn flow_rate(&self) -> f64 {
        self.flow_rate
    }

    pub fn has_fuel(&self) -> bool {
        self.materials.pin.is_some()
    }

    pub(crate) fn set_flow_rate(&mut self, flow_rate: f64) {
        self.flow_rate = flow_rate;
    }

    pub(crate) fn set_id(&mut self, id: AsmId) {
        self.id = id;
    }
}

#[derive(Debug)]
pub struct AssemblyBuilder {
    name: String,
    position: Hex,
    geometry: AssemblyGeometry,
    coolant: String,
    duct: String,
    clad: String,
    correlations: CorrelationNames,
    hotspot: Option<HotspotFactors>,
}

impl AssemblyBuilder {
    pub fn coolant(mut self, name: impl Into<String>) -> Self {
        self.coolant = name.into();
        self
    }

    pub fn duct(mut self, name: impl Into<String>) -> Self {
        self.duct = name.into();
        self
    }

    pub fn clad(mut self, name: impl Into<String>) -> Self {
        self.clad = name.into();
        self
    }

    pub fn correlations(mut self, names: CorrelationNames) -> Self {
        self.correlations = names;
        self
    }

    pub fn hotspot(mut self, factors: HotspotFactors) -> Self {
        self.hotspot = Some(factors);
        self
    }

    /// Resolve materials and correlations. Unknown names fail here.
    pub fn build(self, library: &MaterialLibrary) -> ConfigResult<Assembly> {
        let coolant = library.resolve(&self.coolant)?;
        if coolant.phase() != Phase::Liquid {
            return Err(ConfigError::InvalidAssembly {
                assembly: self.name,
                what: format!("coolant '{}' is not a liquid", coolant.name()),
            });
        }
        let duct = library.resolve(&self.duct)?;
        let clad = library.resolve(&self.clad)?;
        let correlations = CorrelationSet::resolve(&self.correlations)?;

        let pin = match self.geometry.pin_internals() {
            None => None,
            Some(PinInternals::Fuel(model)) => Some(PinMaterials::Fuel {
                fuel: library.resolve(&model.fuel_material)?,
                bond: library.resolve(&model.bond_material)?,
                model: model.clone(),
            }),
            Some(PinInternals::Zones(p)) => Some(PinMaterials::Zones(
                p.zones
                    .iter()
                    .map(|z| Ok((z.outer_fraction, library.resolve(&z.material)?)))
                    .collect::<ConfigResult<Vec<_>>>()?,
            )),
        };

        if let Some(h) = &self.hotspot
            && !(h.sigma_in > 0.0 && h.sigma_out >= 0.0)
        {
            return Err(ConfigError::InvalidAssembly {
                assembly: self.name,
                what: "hot-spot confidence levels must be positive".into(),
            });
        }

        Ok(Assembly {
            id: AsmId::from_index(0),
            name: self.name,
            position: self.position,
            geometry: self.geometry,
            materials: AssemblyMaterials {
                coolant,
                duct,
                clad,
                pin,
            },
            correlations,
            hotspot: self.hotspot,
            flow_rate: 0.0,
        })
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use bf_geometry::{GeometryBuilder, PinBundle};

    /// 61-pin bundle, 1 m tall, sodium cooled.
    pub fn geometry(name: &str, length: f64) -> AssemblyGeometry {
        let bundle = PinBundle {
            rings: 5,
            pin_pitch: 0.00726,
            pin_diameter: 0.0063,
            clad_thickness: 0.0005,
            wire_pitch: 0.2032,
            wire_diameter: 0.00094,
        };
        GeometryBuilder::new(name)
            .bundle(bundle)
            .duct_ftf([0.0585, 0.0625])
            .length(length)
            .build()
            .expect("fixture geometry")
    }

    pub fn assembly(name: &str, position: Hex, length: f64) -> Assembly {
        Assembly::builder(name, position, geometry(name, length))
            .build(&MaterialLibrary::new())
            .expect("fixture assembly")
    }
}
