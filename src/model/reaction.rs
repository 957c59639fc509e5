use crate::expression::{ExpressionTree, MalformedExpression};
use crate::grammar::boolean_grammar;
use crate::utils::{is_unique_id, take_if_not_blank};
use crate::{ContextualValidation, ErrorReporter, RegulatoryMetabolicModel};
use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;
use std::collections::BTreeMap;
use std::sync::OnceLock;
use thiserror::Error;

/// A metabolic reaction with flux bounds, stoichiometry and an optional gene-protein-reaction
/// (GPR) rule.
///
/// The GPR text is parsed using the Boolean grammar on first access and the tree is cached.
/// The cache is only dropped when the GPR is replaced ([`Reaction::set_gpr`]) or explicitly
/// invalidated ([`Reaction::invalidate_gpr`]).
///
/// Expected invariants (checked during validation):
///  - Reaction `id` is unique within the enclosing [`RegulatoryMetabolicModel`].
///  - `lower_bound <= upper_bound`.
///  - Every metabolite of the stoichiometry exists in the model.
///  - The GPR rule (if any) can be parsed.
#[skip_serializing_none]
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Reaction {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub lower_bound: f64,
    pub upper_bound: f64,
    /// Metabolite id -> stoichiometric coefficient (negative for substrates).
    #[serde(default)]
    pub stoichiometry: BTreeMap<String, f64>,
    gpr: Option<String>,
    #[serde(skip)]
    gpr_cache: OnceLock<Result<ExpressionTree, MalformedExpression>>,
}

impl Reaction {
    /// Create a new reaction without stoichiometry and GPR.
    #[must_use]
    pub fn new(id: &str, lower_bound: f64, upper_bound: f64) -> Self {
        Reaction {
            id: id.to_string(),
            lower_bound,
            upper_bound,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_metabolite(mut self, metabolite: &str, coefficient: f64) -> Self {
        self.stoichiometry.insert(metabolite.to_string(), coefficient);
        self
    }

    #[must_use]
    pub fn with_gpr(mut self, gpr: &str) -> Self {
        self.set_gpr(Some(gpr));
        self
    }

    /// The raw GPR text (if any).
    #[must_use]
    pub fn gpr_text(&self) -> Option<&str> {
        self.gpr.as_deref()
    }

    /// Replace the GPR text. A blank rule is the same as no rule. The cached tree is dropped.
    pub fn set_gpr(&mut self, gpr: Option<&str>) {
        self.gpr = gpr.and_then(take_if_not_blank);
        self.invalidate_gpr();
    }

    /// Drop the cached GPR tree. It is re-parsed on the next access.
    pub fn invalidate_gpr(&mut self) {
        self.gpr_cache = OnceLock::new();
    }

    /// The parsed GPR rule. A reaction without a GPR has an empty tree.
    pub fn gpr(&self) -> Result<&ExpressionTree, MalformedExpression> {
        self.gpr_cache
            .get_or_init(|| match &self.gpr {
                Some(rule) => ExpressionTree::parse(rule, boolean_grammar()),
                None => Ok(ExpressionTree::empty()),
            })
            .as_ref()
            .map_err(Clone::clone)
    }

    /// True if the reaction can run backwards.
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        self.lower_bound < 0.0
    }
}

/// The GPR cache is not a part of the reaction identity.
impl PartialEq for Reaction {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
            && self.name == other.name
            && self.lower_bound == other.lower_bound
            && self.upper_bound == other.upper_bound
            && self.stoichiometry == other.stoichiometry
            && self.gpr == other.gpr
    }
}

impl ContextualValidation<RegulatoryMetabolicModel> for Reaction {
    type Error = ReactionError;

    fn validate_all<R: ErrorReporter<Self::Error>>(
        &self,
        context: &RegulatoryMetabolicModel,
        reporter: &mut R,
    ) {
        let Some(unique) = is_unique_id(&context.reactions, self, |it| it.id.clone()) else {
            panic!("Validation called on a reaction that is not part of the model");
        };
        if !unique {
            reporter.report(ReactionError::IdNotUnique {
                id: self.id.clone(),
            });
        }

        if self.lower_bound > self.upper_bound {
            reporter.report(ReactionError::InvalidBounds {
                id: self.id.clone(),
                lower_bound: self.lower_bound,
                upper_bound: self.upper_bound,
            });
        }

        for metabolite in self.stoichiometry.keys() {
            if !context.is_metabolite(metabolite) {
                reporter.report(ReactionError::MetaboliteNotFound {
                    id: self.id.clone(),
                    metabolite: metabolite.clone(),
                });
            }
        }

        if let Err(error) = self.gpr() {
            reporter.report(ReactionError::InvalidGpr {
                id: self.id.clone(),
                error,
            });
        }
    }
}

/// Possible validation errors for [`Reaction`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReactionError {
    #[error("(Reaction id: `{id}`) Id must be unique within the enclosing model")]
    IdNotUnique { id: String },
    #[error("(Reaction id: `{id}`) Lower bound `{lower_bound}` exceeds upper bound `{upper_bound}`")]
    InvalidBounds {
        id: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("(Reaction id: `{id}`) Metabolite `{metabolite}` not found in the enclosing model")]
    MetaboliteNotFound { id: String, metabolite: String },
    #[error("(Reaction id: `{id}`) {error}")]
    InvalidGpr {
        id: String,
        error: MalformedExpression,
    },
}
