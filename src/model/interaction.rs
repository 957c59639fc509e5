use crate::expression::{ExpressionTree, MalformedExpression};
use crate::grammar::boolean_grammar;
use crate::utils::is_unique_id;
use crate::{ContextualValidation, ErrorReporter, RegulatoryMetabolicModel};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single regulatory event: if the Boolean `expression` holds, the target of the enclosing
/// [`Interaction`] takes the value `coefficient`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct RegulatoryEvent {
    pub coefficient: f64,
    pub expression: String,
}

/// Regulation of one `target` (a gene, regulator, reaction or metabolite) through an ordered
/// list of events.
///
/// Events are tested in declaration order and the first event whose expression holds decides
/// the next coefficient of the target. If no event holds, the coefficient is `0`.
///
/// Expected invariants (checked during validation):
///  - The `target` exists in the enclosing [`RegulatoryMetabolicModel`].
///  - There is at most one interaction per target.
///  - All event expressions can be parsed.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    pub target: String,
    #[serde(default)]
    pub events: Vec<RegulatoryEvent>,
}

impl Interaction {
    #[must_use]
    pub fn new(target: &str) -> Self {
        Interaction {
            target: target.to_string(),
            events: Vec::new(),
        }
    }

    /// Append an event with the lowest priority so far.
    #[must_use]
    pub fn with_event(mut self, coefficient: f64, expression: &str) -> Self {
        self.events.push(RegulatoryEvent {
            coefficient,
            expression: expression.to_string(),
        });
        self
    }

    /// Parse all event expressions (using the Boolean grammar), preserving their order.
    pub fn parse_events(&self) -> Result<Vec<(f64, ExpressionTree)>, MalformedExpression> {
        self.events
            .iter()
            .map(|event| {
                let tree = ExpressionTree::parse(&event.expression, boolean_grammar())?;
                Ok((event.coefficient, tree))
            })
            .collect()
    }
}

impl ContextualValidation<RegulatoryMetabolicModel> for Interaction {
    type Error = InteractionError;

    fn validate_all<R: ErrorReporter<Self::Error>>(
        &self,
        context: &RegulatoryMetabolicModel,
        reporter: &mut R,
    ) {
        if !context.is_known_identifier(&self.target) {
            reporter.report(InteractionError::TargetNotFound {
                target: self.target.clone(),
            });
        }

        let Some(unique) = is_unique_id(&context.interactions, self, |it| it.target.clone())
        else {
            panic!("Validation called on an interaction that is not part of the model");
        };
        if !unique {
            reporter.report(InteractionError::TargetNotUnique {
                target: self.target.clone(),
            });
        }

        for event in &self.events {
            if let Err(error) = ExpressionTree::parse(&event.expression, boolean_grammar()) {
                reporter.report(InteractionError::InvalidEvent {
                    target: self.target.clone(),
                    error,
                });
            }
        }
    }
}

/// Possible validation errors for [`Interaction`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Hash)]
pub enum InteractionError {
    #[error("(Interaction target: `{target}`) Target not found in the enclosing model")]
    TargetNotFound { target: String },
    #[error("(Interaction target: `{target}`) Only one interaction per target is allowed")]
    TargetNotUnique { target: String },
    #[error("(Interaction target: `{target}`) {error}")]
    InvalidEvent {
        target: String,
        error: MalformedExpression,
    },
}

#[cfg(test)]
mod tests {
    use crate::model::tests::simple_model;
    use crate::{ContextualValidation, Interaction, InteractionError};

    #[test]
    fn events_keep_declaration_order() {
        let interaction = Interaction::new("T")
            .with_event(1.0, "R > 0")
            .with_event(0.0, "1");
        let events = interaction.parse_events().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].0, 1.0);
        assert_eq!(events[0].1.to_string(), "R > 0");
        assert_eq!(events[1].1.to_string(), "1");
    }

    #[test]
    fn malformed_event() {
        let interaction = Interaction::new("T").with_event(1.0, "A and (B");
        let error = interaction.parse_events().unwrap_err();
        assert_eq!(error.expression, "A and (B");
    }

    #[test]
    fn interaction_validation() {
        let mut model = simple_model();
        model.interactions.push(Interaction::new("ghost").with_event(1.0, "A &"));
        model.interactions.push(Interaction::new("ghost"));
        let issues = model.interactions[1].validate(&model).unwrap_err();
        assert_eq!(issues.len(), 3);
        assert_eq!(
            issues[0],
            InteractionError::TargetNotFound {
                target: "ghost".to_string()
            }
        );
        assert_eq!(
            issues[1],
            InteractionError::TargetNotUnique {
                target: "ghost".to_string()
            }
        );
        assert!(matches!(issues[2], InteractionError::InvalidEvent { .. }));
        assert!(model.interactions[0].validate(&model).is_ok());
    }
}
