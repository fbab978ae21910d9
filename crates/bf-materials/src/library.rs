//! Name resolution for materials.

use crate::builtin::Builtin;
use crate::catalog::{builtin_catalog, lookup_builtin};
use crate::error::{MaterialError, MaterialResult};
use crate::model::Material;
use crate::polynomial::PolynomialModel;
use crate::table::TabulatedModel;
use std::collections::HashMap;
use std::sync::Arc;

/// Resolves material names to shared, immutable `Material` handles.
///
/// Lookup order: built-in correlations, then user polynomials, then user
/// tables. Names are case-insensitive.
#[derive(Debug)]
pub struct MaterialLibrary {
    builtins: HashMap<Builtin, Arc<Material>>,
    polynomials: HashMap<String, Arc<Material>>,
    tables: HashMap<String, Arc<Material>>,
}

impl Default for MaterialLibrary {
    fn default() -> Self {
        Self::new()
    }
}

fn key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

impl MaterialLibrary {
    pub fn new() -> Self {
        let builtins = builtin_catalog()
            .iter()
            .map(|entry| {
                (
                    entry.material,
                    Arc::new(Material::new(entry.canonical_id, entry.material)),
                )
            })
            .collect();

        Self {
            builtins,
            polynomials: HashMap::new(),
            tables: HashMap::new(),
        }
    }

    fn check_free(&self, name: &str) -> MaterialResult<()> {
        if lookup_builtin(name).is_some() {
            return Err(MaterialError::InvalidDefinition {
                material: name.to_string(),
                what: "name is reserved by a built-in correlation".to_string(),
            });
        }
        Ok(())
    }

    /// Register user polynomial coefficients under `name`.
    pub fn register_polynomial(
        &mut self,
        name: &str,
        model: PolynomialModel,
    ) -> MaterialResult<Arc<Material>> {
        self.check_free(name)?;
        model.validate(name)?;
        let material = Arc::new(Material::new(name.trim(), model));
        self.polynomials.insert(key(name), Arc::clone(&material));
        Ok(material)
    }

    /// Register tabulated data under `name`.
    pub fn register_table(
        &mut self,
        name: &str,
        model: TabulatedModel,
    ) -> MaterialResult<Arc<Material>> {
        self.check_free(name)?;
        let material = Arc::new(Material::new(name.trim(), model));
        self.tables.insert(key(name), Arc::clone(&material));
        Ok(material)
    }

    pub fn resolve(&self, name: &str) -> MaterialResult<Arc<Material>> {
        if let Some(entry) = lookup_builtin(name)
            && let Some(material) = self.builtins.get(&entry.material)
        {
            return Ok(Arc::clone(material));
        }

        let k = key(name);
        self.polynomials
            .get(&k)
            .or_else(|| self.tables.get(&k))
            .map(Arc::clone)
            .ok_or_else(|| MaterialError::UnknownMaterial {
                name: name.to_string(),
            })
    }

    /// Names of all user-registered materials.
    pub fn user_materials(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .polynomials
            .values()
            .chain(self.tables.values())
            .map(|m| m.name())
            .collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Phase, RawProperties};
    use bf_core::units::k;

    fn coolant_poly() -> PolynomialModel {
        PolynomialModel {
            density: vec![850.0],
            heat_capacity: vec![1270.0],
            conductivity: vec![65.0],
            viscosity: vec![2.5e-4],
            range: None,
        }
    }

    #[test]
    fn builtin_aliases_share_one_instance() {
        let lib = MaterialLibrary::new();
        let a = lib.resolve("na").unwrap();
        let b = lib.resolve("Sodium").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(a.kind(), "built-in");
    }

    #[test]
    fn unknown_name_fails() {
        let lib = MaterialLibrary::new();
        let err = lib.resolve("mercury").unwrap_err();
        assert_eq!(
            err,
            MaterialError::UnknownMaterial {
                name: "mercury".into()
            }
        );
    }

    #[test]
    fn polynomial_resolves_before_table() {
        let mut lib = MaterialLibrary::new();
        lib.register_polynomial("coolant", coolant_poly()).unwrap();
        let row = RawProperties {
            rho: 1.0,
            cp: 1.0,
            k: 1.0,
            mu: 1.0,
        };
        let table =
            TabulatedModel::new("coolant", vec![300.0, 400.0], vec![row, row], Phase::Liquid)
                .unwrap();
        lib.register_table("COOLANT", table).unwrap();

        let mat = lib.resolve("Coolant").unwrap();
        assert_eq!(mat.kind(), "polynomial");
        let eval = mat.properties(k(500.0)).unwrap();
        assert_eq!(eval.properties.density.value, 850.0);
    }

    #[test]
    fn builtin_names_are_reserved() {
        let mut lib = MaterialLibrary::new();
        assert!(lib.register_polynomial("lead", coolant_poly()).is_err());
        assert!(lib.user_materials().is_empty());
    }
}
