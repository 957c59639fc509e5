/// Definition of [`Interaction`] and [`RegulatoryEvent`].
mod interaction;
/// Definition of [`Reaction`] including the GPR cache.
mod reaction;
/// Definition of the main struct [`RegulatoryMetabolicModel`].
mod regulatory_metabolic_model;

pub use interaction::{Interaction, InteractionError, RegulatoryEvent};
pub use reaction::{Reaction, ReactionError};
pub use regulatory_metabolic_model::{Metabolite, ModelError, RegulatoryMetabolicModel};

#[cfg(test)]
pub(crate) mod tests {
    use crate::{Interaction, Metabolite, Reaction, RegulatoryMetabolicModel};

    /// A glucose uptake network: `EX_glc` imports glucose, `UPT` converts it into biomass
    /// precursor `pre`, which is drained by `BIOMASS_drain`. Gene `g_up` (required by `UPT`)
    /// is active unless regulator `R` is present.
    pub fn simple_model() -> RegulatoryMetabolicModel {
        let mut model = RegulatoryMetabolicModel::new("simple");
        model.metabolites = vec![Metabolite::new("glc"), Metabolite::new("pre")];
        model.genes = vec!["g_up".to_string()];
        model.regulators = vec!["R".to_string()];
        model.reactions = vec![
            Reaction::new("EX_glc", 0.0, 10.0).with_metabolite("glc", 1.0),
            Reaction::new("UPT", 0.0, 1000.0)
                .with_metabolite("glc", -1.0)
                .with_metabolite("pre", 1.0)
                .with_gpr("g_up"),
            Reaction::new("BIOMASS_drain", 0.0, 1000.0).with_metabolite("pre", -1.0),
        ];
        model.interactions = vec![Interaction::new("g_up").with_event(1.0, "not R")];
        model.set_objective("BIOMASS_drain");
        model
    }
}
