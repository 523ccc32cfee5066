//! Single-pass flattening of the remisión tree
//!
//! Every downstream aggregate works on the flat rows produced here, so the
//! nested remisión → muestreo → muestra → ensayo walk happens exactly once
//! per analysis and adjusted values are computed exactly once per ensayo.

use std::collections::BTreeSet;

use tracing::{debug, warn};

use crate::models::{Ensayo, GuaranteeAge, Muestreo, Recipe, RecipeCatalog, Remision};
use crate::quality::adjustment::Calibration;

/// A muestreo together with its parents
#[derive(Debug, Clone, Copy)]
pub struct MuestreoContext<'a> {
    pub muestreo: &'a Muestreo,
    pub remision: &'a Remision,
    pub recipe: Option<&'a Recipe>,
}

impl<'a> MuestreoContext<'a> {
    /// Specified strength, 0 when the recipe is unknown
    pub fn strength_fc(&self) -> f64 {
        self.recipe.map(|r| r.strength_fc).unwrap_or(0.0)
    }

    /// The muestreo's own guarantee age, else the recipe's
    pub fn guarantee_age(&self) -> Option<GuaranteeAge> {
        self.muestreo
            .guarantee_age
            .or_else(|| self.recipe.map(|r| r.guarantee_age))
    }
}

/// One ensayo with its parents and adjusted values
#[derive(Debug, Clone, Copy)]
pub struct EnsayoRow<'a> {
    pub ensayo: &'a Ensayo,
    /// Index into [`FlatView::muestreos`]
    pub muestreo_index: usize,
    pub muestreo: &'a Muestreo,
    pub remision: &'a Remision,
    pub recipe: Option<&'a Recipe>,
    pub adjusted_resistance: f64,
    pub compliance: f64,
}

impl<'a> EnsayoRow<'a> {
    pub fn is_valid(&self) -> bool {
        self.ensayo.is_valid_for_compliance()
    }

    /// Recomputed compliance exists: positive adjusted resistance against a known fc
    pub fn has_compliance(&self) -> bool {
        self.compliance > 0.0
    }
}

/// Flattened analysis input
#[derive(Debug, Clone, Default)]
pub struct FlatView<'a> {
    pub remisiones: Vec<&'a Remision>,
    pub muestreos: Vec<MuestreoContext<'a>>,
    pub rows: Vec<EnsayoRow<'a>>,
}

impl<'a> FlatView<'a> {
    pub fn valid_rows(&self) -> impl Iterator<Item = &EnsayoRow<'a>> {
        self.rows.iter().filter(|row| row.is_valid())
    }

    /// Ensayos at guarantee age, including out-of-time ones
    pub fn guarantee_age_rows(&self) -> impl Iterator<Item = &EnsayoRow<'a>> {
        self.rows.iter().filter(|row| row.ensayo.is_guarantee_age())
    }
}

/// Flatten remisiones into muestreo contexts and ensayo rows
pub fn flatten<'a, I>(remisiones: I, catalog: &'a RecipeCatalog, calibration: &Calibration) -> FlatView<'a>
where
    I: IntoIterator<Item = &'a Remision>,
{
    let mut view = FlatView::default();
    let mut unknown_recipes = BTreeSet::new();

    for remision in remisiones {
        view.remisiones.push(remision);

        let recipe = catalog.get(&remision.recipe_id);
        if recipe.is_none() {
            unknown_recipes.insert(remision.recipe_id.as_str());
        }
        let strength_fc = recipe.map(|r| r.strength_fc).unwrap_or(0.0);

        for muestreo in &remision.muestreos {
            let muestreo_index = view.muestreos.len();
            view.muestreos.push(MuestreoContext {
                muestreo,
                remision,
                recipe,
            });

            for ensayo in muestreo.ensayos() {
                let (adjusted_resistance, compliance) =
                    calibration.adjusted_compliance(ensayo.resistencia_calculada, strength_fc);
                view.rows.push(EnsayoRow {
                    ensayo,
                    muestreo_index,
                    muestreo,
                    remision,
                    recipe,
                    adjusted_resistance,
                    compliance,
                });
            }
        }
    }

    for recipe_id in unknown_recipes {
        warn!(
            "Recipe {} not found in catalog, its ensayos will report 0% compliance",
            recipe_id
        );
    }

    debug!(
        "Flattened {} remisiones into {} muestreos and {} ensayos",
        view.remisiones.len(),
        view.muestreos.len(),
        view.rows.len()
    );

    view
}
