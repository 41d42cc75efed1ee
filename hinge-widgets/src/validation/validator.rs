//! Fluent validator over one or more widgets.

use std::future::Future;
use std::pin::Pin;

use chrono::NaiveDate;
use regex::Regex;

use super::result::{FieldError, ValidationResult};
use super::validatable::Validatable;

/// Boxed future returned by async rules.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// One rule on a value of type `V`, with the message shown when it fails.
enum Rule<V> {
    Check {
        passes: Box<dyn Fn(&V) -> bool + Send + Sync>,
        message: String,
    },
    Lookup {
        passes: Box<dyn Fn(V) -> BoxFuture<'static, bool> + Send + Sync>,
        message: String,
    },
}

/// A widget together with its rules, erased to its value type.
trait FieldCheck: Send + Sync {
    fn name(&self) -> &str;

    fn widget_id(&self) -> String;

    /// First failing synchronous rule.
    fn check_sync(&self) -> Option<String>;

    /// First failing rule, synchronous rules first.
    fn check_all(&self) -> BoxFuture<'_, Option<String>>;

    /// Write the outcome onto the widget.
    fn report(&self, message: Option<&str>);
}

struct Field<W: Validatable> {
    widget: W,
    name: String,
    rules: Vec<Rule<W::Value>>,
}

impl<W> FieldCheck for Field<W>
where
    W: Validatable + 'static,
    W::Value: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn widget_id(&self) -> String {
        self.widget.widget_id()
    }

    fn check_sync(&self) -> Option<String> {
        let value = self.widget.validation_value();
        self.rules.iter().find_map(|rule| match rule {
            Rule::Check { passes, message } if !passes(&value) => Some(message.clone()),
            _ => None,
        })
    }

    fn check_all(&self) -> BoxFuture<'_, Option<String>> {
        Box::pin(async move {
            if let Some(message) = self.check_sync() {
                return Some(message);
            }
            let value = self.widget.validation_value();
            for rule in &self.rules {
                if let Rule::Lookup { passes, message } = rule
                    && !passes(value.clone()).await
                {
                    return Some(message.clone());
                }
            }
            None
        })
    }

    fn report(&self, message: Option<&str>) {
        match message {
            Some(message) => self.widget.set_error(message),
            None => self.widget.clear_error(),
        }
    }
}

/// Runs rules across several widgets.
///
/// Each field reports at most one error, from its first failing rule, and
/// the message is written onto the widget. Fields that pass have their
/// error cleared.
#[derive(Default)]
pub struct Validator {
    fields: Vec<Box<dyn FieldCheck>>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start adding rules for `widget`.
    pub fn field<W>(self, widget: &W, name: impl Into<String>) -> FieldBuilder<W>
    where
        W: Validatable + Clone + 'static,
        W::Value: Clone + Send + Sync + 'static,
    {
        FieldBuilder {
            validator: self,
            field: Field {
                widget: widget.clone(),
                name: name.into(),
                rules: Vec::new(),
            },
        }
    }

    /// Run the synchronous rules. Async rules are skipped.
    pub fn validate(self) -> ValidationResult {
        let outcomes = self.fields.iter().map(|field| field.check_sync()).collect();
        self.conclude(outcomes)
    }

    /// Run every rule. Fields are checked one after another.
    pub async fn validate_async(self) -> ValidationResult {
        let mut outcomes = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            outcomes.push(field.check_all().await);
        }
        self.conclude(outcomes)
    }

    fn conclude(self, outcomes: Vec<Option<String>>) -> ValidationResult {
        let mut errors = Vec::new();
        for (field, outcome) in self.fields.iter().zip(outcomes) {
            field.report(outcome.as_deref());
            if let Some(message) = outcome {
                errors.push(FieldError {
                    field_name: field.name().to_string(),
                    widget_id: field.widget_id(),
                    message,
                });
            }
        }
        if !errors.is_empty() {
            log::debug!("Validator: {} of {} field(s) invalid", errors.len(), self.fields.len());
        }
        ValidationResult::from_errors(errors)
    }
}

/// Rules for a single field. Finished by starting the next field or by
/// validating.
pub struct FieldBuilder<W: Validatable> {
    validator: Validator,
    field: Field<W>,
}

impl<W> FieldBuilder<W>
where
    W: Validatable + Clone + 'static,
    W::Value: Clone + Send + Sync + 'static,
{
    /// `passes` returns true when the value is acceptable.
    pub fn rule(
        mut self,
        passes: impl Fn(&W::Value) -> bool + Send + Sync + 'static,
        msg: impl Into<String>,
    ) -> Self {
        self.field.rules.push(Rule::Check {
            passes: Box::new(passes),
            message: msg.into(),
        });
        self
    }

    /// A rule that needs to await something, e.g. a lookup against a
    /// service. Only [`FieldBuilder::validate_async`] runs it.
    pub fn rule_async<F, Fut>(mut self, passes: F, msg: impl Into<String>) -> Self
    where
        F: Fn(W::Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = bool> + Send + 'static,
    {
        let lookup: Box<dyn Fn(W::Value) -> BoxFuture<'static, bool> + Send + Sync> =
            Box::new(move |value| -> BoxFuture<'static, bool> { Box::pin(passes(value)) });
        self.field.rules.push(Rule::Lookup {
            passes: lookup,
            message: msg.into(),
        });
        self
    }

    pub fn field<W2>(self, widget: &W2, name: impl Into<String>) -> FieldBuilder<W2>
    where
        W2: Validatable + Clone + 'static,
        W2::Value: Clone + Send + Sync + 'static,
    {
        self.finish().field(widget, name)
    }

    pub fn validate(self) -> ValidationResult {
        self.finish().validate()
    }

    pub async fn validate_async(self) -> ValidationResult {
        self.finish().validate_async().await
    }

    fn finish(self) -> Validator {
        let mut validator = self.validator;
        validator.fields.push(Box::new(self.field));
        validator
    }
}

impl<T, W> FieldBuilder<W>
where
    T: Clone + Send + Sync + 'static,
    W: Validatable<Value = Option<T>> + Clone + 'static,
{
    /// Something must be selected.
    pub fn selected(self, msg: impl Into<String>) -> Self {
        self.rule(Option::is_some, msg)
    }
}

impl<W: Validatable<Value = Vec<String>> + Clone + 'static> FieldBuilder<W> {
    pub fn min_items(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(move |items| items.len() >= min, msg)
    }

    pub fn max_items(self, max: usize, msg: impl Into<String>) -> Self {
        self.rule(move |items| items.len() <= max, msg)
    }

    pub fn each_matches(self, pattern: Regex, msg: impl Into<String>) -> Self {
        self.rule(move |items| items.iter().all(|item| pattern.is_match(item)), msg)
    }
}

impl<W: Validatable<Value = [f64; 2]> + Clone + 'static> FieldBuilder<W> {
    /// `high - low` must be at least `span`.
    pub fn min_span(self, span: f64, msg: impl Into<String>) -> Self {
        self.rule(move |[low, high]| high - low >= span, msg)
    }
}

// An empty date passes both bounds; pair with `selected` to require one.
impl<W: Validatable<Value = Option<NaiveDate>> + Clone + 'static> FieldBuilder<W> {
    pub fn not_before(self, min: NaiveDate, msg: impl Into<String>) -> Self {
        self.rule(move |date| date.is_none_or(|d| d >= min), msg)
    }

    pub fn not_after(self, max: NaiveDate, msg: impl Into<String>) -> Self {
        self.rule(move |date| date.is_none_or(|d| d <= max), msg)
    }
}
