use crate::expression::{ExpressionTree, MalformedExpression};
use crate::{
    ContextualValidation, ErrorReporter, Interaction, InteractionError, Reaction, ReactionError,
    Validation,
};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

/// A metabolite of a [`RegulatoryMetabolicModel`].
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Metabolite {
    pub id: String,
    pub name: Option<String>,
    pub compartment: Option<String>,
}

impl Metabolite {
    #[must_use]
    pub fn new(id: &str) -> Self {
        Metabolite {
            id: id.to_string(),
            name: None,
            compartment: None,
        }
    }
}

/// A metabolic network (reactions, metabolites, genes) coupled with a regulatory network
/// (regulators and their interactions).
///
/// The `objective` is a linear function over reaction fluxes (reaction id -> coefficient).
///
/// The model is a plain data container: it can be built in code or deserialized by an
/// external loader. Use [`Validation::validate`] to check its consistency.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RegulatoryMetabolicModel {
    pub id: String,
    #[serde(default)]
    pub reactions: Vec<Reaction>,
    #[serde(default)]
    pub metabolites: Vec<Metabolite>,
    #[serde(default)]
    pub genes: Vec<String>,
    #[serde(default)]
    pub regulators: Vec<String>,
    #[serde(default)]
    pub interactions: Vec<Interaction>,
    #[serde(default)]
    pub objective: BTreeMap<String, f64>,
}

impl RegulatoryMetabolicModel {
    #[must_use]
    pub fn new(id: &str) -> Self {
        RegulatoryMetabolicModel {
            id: id.to_string(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn find_reaction(&self, id: &str) -> Option<&Reaction> {
        self.reactions.iter().find(|it| it.id == id)
    }

    #[must_use]
    pub fn find_metabolite(&self, id: &str) -> Option<&Metabolite> {
        self.metabolites.iter().find(|it| it.id == id)
    }

    /// Find the interaction that regulates the given `target`.
    #[must_use]
    pub fn find_interaction(&self, target: &str) -> Option<&Interaction> {
        self.interactions.iter().find(|it| it.target == target)
    }

    #[must_use]
    pub fn is_reaction(&self, id: &str) -> bool {
        self.find_reaction(id).is_some()
    }

    #[must_use]
    pub fn is_metabolite(&self, id: &str) -> bool {
        self.find_metabolite(id).is_some()
    }

    #[must_use]
    pub fn is_gene(&self, id: &str) -> bool {
        self.genes.iter().any(|it| it == id)
    }

    #[must_use]
    pub fn is_regulator(&self, id: &str) -> bool {
        self.regulators.iter().any(|it| it == id)
    }

    /// True if `id` names a reaction, metabolite, gene or regulator of this model.
    #[must_use]
    pub fn is_known_identifier(&self, id: &str) -> bool {
        self.is_reaction(id) || self.is_metabolite(id) || self.is_gene(id) || self.is_regulator(id)
    }

    /// The (cached) parsed GPR of a reaction. Returns `None` if the reaction does not exist.
    #[must_use]
    pub fn gpr(&self, reaction_id: &str) -> Option<Result<&ExpressionTree, MalformedExpression>> {
        self.find_reaction(reaction_id).map(Reaction::gpr)
    }

    /// Set the objective to maximize (or minimize) the flux of a single reaction.
    pub fn set_objective(&mut self, reaction_id: &str) {
        self.objective.clear();
        self.objective.insert(reaction_id.to_string(), 1.0);
    }
}

/// Possible validation errors for [`RegulatoryMetabolicModel`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error(transparent)]
    Reaction(#[from] ReactionError),
    #[error(transparent)]
    Interaction(#[from] InteractionError),
    #[error("Identifier `{id}` is declared more than once")]
    DuplicateIdentifier { id: String },
    #[error("Objective references unknown reaction `{id}`")]
    ObjectiveReactionNotFound { id: String },
}

impl Validation for RegulatoryMetabolicModel {
    type Error = ModelError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, reporter: &mut R) {
        for reaction in &self.reactions {
            reaction.validate_all(self, &mut reporter.wrap());
        }

        for interaction in &self.interactions {
            interaction.validate_all(self, &mut reporter.wrap());
        }

        // Metabolites, genes and regulators share one namespace (they can all appear in rules).
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        let identifiers = self
            .metabolites
            .iter()
            .map(|it| it.id.as_str())
            .chain(self.genes.iter().map(String::as_str))
            .chain(self.regulators.iter().map(String::as_str));
        for id in identifiers {
            if !seen.insert(id) && reported.insert(id) {
                reporter.report(ModelError::DuplicateIdentifier { id: id.to_string() });
            }
        }

        for id in self.objective.keys() {
            if !self.is_reaction(id) {
                reporter.report(ModelError::ObjectiveReactionNotFound { id: id.clone() });
            }
        }
    }
}
