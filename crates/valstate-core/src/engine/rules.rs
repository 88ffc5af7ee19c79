//! Rule-registry validation engine
//!
//! Rules are registered per attribute, optionally scoped to a schema, and run
//! in registration order. Unscoped rules always run; a scoped rule runs only
//! when the request's selector names its schema. Each rule is a predicate
//! over the attribute's current value and its initial (baseline) value.

use async_trait::async_trait;
use std::sync::Arc;

use super::{ValidationEngine, ValidationRequest};
use crate::errors::{CoordinatorError, Result};
use crate::model::{AttributeValue, SchemaSelector, ValidationErrors};

/// Failure message template; `{attribute}` and `{rule}` are substituted
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "{attribute} failed {rule} validation";

type Predicate = dyn Fn(&AttributeValue, Option<&AttributeValue>) -> bool + Send + Sync;

/// One named check on one attribute
#[derive(Clone)]
pub struct Rule {
    attribute: String,
    name: String,
    schema: Option<String>,
    check: Arc<Predicate>,
}

impl Rule {
    /// Rule that runs under every schema selection
    pub fn new<F>(attribute: impl Into<String>, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&AttributeValue, Option<&AttributeValue>) -> bool + Send + Sync + 'static,
    {
        Self {
            attribute: attribute.into(),
            name: name.into(),
            schema: None,
            check: Arc::new(check),
        }
    }

    /// Restrict the rule to requests whose selector names `schema`
    #[must_use]
    pub fn in_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema(&self) -> Option<&str> {
        self.schema.as_deref()
    }

    fn applies_to(&self, selector: Option<&SchemaSelector>) -> bool {
        match (&self.schema, selector) {
            (None, _) => true,
            (Some(schema), Some(selector)) => selector.includes(schema),
            (Some(_), None) => false,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("attribute", &self.attribute)
            .field("name", &self.name)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}

/// Ordered rule registry implementing `ValidationEngine`
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: Vec<Rule>,
    template: String,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self {
            rules: Vec::new(),
            template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        }
    }
}

impl RuleEngine {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.template = template.into();
        self
    }

    /// Add a rule
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError::DuplicateRule` if a rule with the same
    /// attribute, name and schema is already registered.
    pub fn register(&mut self, rule: Rule) -> Result<()> {
        let duplicate = self.rules.iter().any(|existing| {
            existing.attribute == rule.attribute
                && existing.name == rule.name
                && existing.schema == rule.schema
        });
        if duplicate {
            return Err(CoordinatorError::DuplicateRule {
                attribute: rule.attribute,
                rule: rule.name,
                schema: rule.schema,
            });
        }
        self.rules.push(rule);
        Ok(())
    }

    /// Builder-style `register`
    ///
    /// # Errors
    ///
    /// Same as [`RuleEngine::register`].
    pub fn with_rule(mut self, rule: Rule) -> Result<Self> {
        self.register(rule)?;
        Ok(self)
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Run every applicable rule synchronously
    ///
    /// Rules whose attribute is absent from the request are skipped.
    pub fn evaluate(&self, request: &ValidationRequest) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        for rule in self
            .rules
            .iter()
            .filter(|rule| rule.applies_to(request.schema.as_ref()))
        {
            let Some(value) = request.attributes.get(&rule.attribute) else {
                continue;
            };
            let initial = request.initial.get(&rule.attribute);
            if !(rule.check)(value, initial) {
                errors.push(rule.attribute.clone(), self.message_for(rule));
            }
        }
        errors
    }

    fn message_for(&self, rule: &Rule) -> String {
        self.template
            .replace("{attribute}", &rule.attribute)
            .replace("{rule}", &rule.name)
    }
}

#[async_trait]
impl ValidationEngine for RuleEngine {
    async fn validate(&self, request: ValidationRequest) -> Result<ValidationErrors> {
        Ok(self.evaluate(&request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AttributeSnapshot;

    fn name_rules() -> RuleEngine {
        RuleEngine::new()
            .with_rule(Rule::new("name", "nameIsDavid", |name, initial| {
                initial.is_some_and(|i| i.is_identical(name)) || name.as_str() == Some("David")
            }))
            .and_then(|engine| {
                engine.with_rule(
                    Rule::new("name", "nameIsAdmin", |name, _| name.as_str() == Some("Admin"))
                        .in_schema("admin"),
                )
            })
            .unwrap()
    }

    fn request(name: &str, schema: Option<&str>) -> ValidationRequest {
        ValidationRequest {
            attributes: AttributeSnapshot::new().with("name", name),
            initial: AttributeSnapshot::new().with("name", "omar"),
            schema: schema.map(SchemaSelector::from),
        }
    }

    #[test]
    fn test_initial_value_passes() {
        assert!(name_rules().evaluate(&request("omar", None)).is_empty());
    }

    #[test]
    fn test_default_rule_failure_message() {
        let errors = name_rules().evaluate(&request("robert", None));
        assert_eq!(
            errors.get("name"),
            Some(&["name failed nameIsDavid validation".to_string()][..])
        );
    }

    #[test]
    fn test_scoped_rule_only_under_its_schema() {
        assert!(name_rules().evaluate(&request("David", None)).is_empty());

        let errors = name_rules().evaluate(&request("David", Some("admin")));
        assert_eq!(
            errors.get("name"),
            Some(&["name failed nameIsAdmin validation".to_string()][..])
        );
    }

    #[test]
    fn test_unscoped_rules_still_run_under_schema() {
        let errors = name_rules().evaluate(&request("Admin", Some("admin")));
        assert_eq!(
            errors.get("name"),
            Some(&["name failed nameIsDavid validation".to_string()][..])
        );
    }

    #[test]
    fn test_absent_attribute_skipped() {
        let request = ValidationRequest {
            attributes: AttributeSnapshot::new(),
            initial: AttributeSnapshot::new(),
            schema: None,
        };
        assert!(name_rules().evaluate(&request).is_empty());
    }

    #[test]
    fn test_duplicate_rule_rejected() {
        let mut engine = name_rules();
        let err = engine
            .register(Rule::new("name", "nameIsDavid", |_, _| true))
            .unwrap_err();

        assert!(matches!(err, CoordinatorError::DuplicateRule { .. }));
        assert_eq!(engine.rules().len(), 2);
    }

    #[test]
    fn test_same_name_in_other_schema_allowed() {
        let mut engine = name_rules();
        assert!(engine
            .register(Rule::new("name", "nameIsDavid", |_, _| true).in_schema("admin"))
            .is_ok());
    }

    #[test]
    fn test_custom_template() {
        let engine = name_rules().with_message_template("{rule} rejected {attribute}");
        let errors = engine.evaluate(&request("robert", None));
        assert_eq!(
            errors.get("name"),
            Some(&["nameIsDavid rejected name".to_string()][..])
        );
    }
}
