//! Form store: owns every field, aggregates state, runs the submit protocol

use super::descriptor::FieldGroup;
use super::error::{FormError, Result};
use super::field::FieldStore;
use super::validation::ValidationContext;
use super::value::{Externals, FieldValues, ScalarValue};
use indexmap::IndexMap;
use std::fmt;
use std::ops::Deref;

/// Construction options for a [`FormStore`]
#[derive(Debug, Clone, Default)]
pub struct FormOptions {
    pub externals: Option<Externals>,
}

impl FormOptions {
    pub fn externals(mut self, externals: Externals) -> Self {
        self.externals = Some(externals);
        self
    }
}

/// Notification sent to subscribers after a mutation has completed
#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    FieldUpdated { name: String },
    SubmittedChanged { is_submitted: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&FormEvent) + Send>;

/// Receives the value snapshot of a successful submit
#[cfg_attr(test, mockall::automock)]
pub trait SubmitHandler {
    fn submit(&mut self, values: &FieldValues);
}

/// Result of a submit attempt
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Values were delivered and the form is marked submitted
    Submitted(FieldValues),
    /// At least one field is invalid; nothing was delivered
    Rejected { invalid_fields: Vec<String> },
}

impl SubmitOutcome {
    pub fn is_submitted(&self) -> bool {
        matches!(self, SubmitOutcome::Submitted(_))
    }
}

/// Aggregate root owning every field of one form session
pub struct FormStore {
    fields: IndexMap<String, FieldStore>,
    externals: Externals,
    is_submitted: bool,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl FormStore {
    /// Build a store from a descriptor tree, flattening groups into dotted names
    pub fn new(group: FieldGroup, options: FormOptions) -> Result<Self> {
        let mut fields = IndexMap::new();
        for (name, descriptor) in group.flatten()? {
            let field = FieldStore::new(name.clone(), descriptor);
            fields.insert(name, field);
        }

        tracing::debug!("Created form with {} fields", fields.len());

        Ok(Self {
            fields,
            externals: options.externals.unwrap_or_default(),
            is_submitted: false,
            listeners: Vec::new(),
            next_subscription: 0,
        })
    }

    /// Field at an exact flattened name
    pub fn get_field(&self, name: &str) -> Option<&FieldStore> {
        self.fields.get(name)
    }

    /// Mutable handle to a field
    pub fn field_mut(&mut self, name: &str) -> Option<FieldHandle<'_>> {
        let index = self.fields.get_index_of(name)?;
        Some(FieldHandle { form: self, index })
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldStore> {
        self.fields.values()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn externals(&self) -> &Externals {
        &self.externals
    }

    pub fn externals_mut(&mut self) -> &mut Externals {
        &mut self.externals
    }

    pub fn is_submitted(&self) -> bool {
        self.is_submitted
    }

    /// Live snapshot of every field value
    pub fn values(&self) -> FieldValues {
        self.fields
            .iter()
            .map(|(name, field)| (name.clone(), field.value().clone()))
            .collect()
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.values().any(FieldStore::is_dirty)
    }

    /// Whether any field currently holds an error. Does not re-validate.
    pub fn is_invalid(&self) -> bool {
        self.fields.values().any(|field| field.error().is_some())
    }

    /// Fields currently in error, as `(name, message)`
    pub fn errors(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter_map(|(name, field)| field.error().map(|error| (name.as_str(), error)))
    }

    /// Validate every field in declaration order
    pub fn validate(&mut self, force: bool) {
        if !self.fields.values().any(|field| field.should_validate(force)) {
            return;
        }

        let values = self.values();
        let ctx = ValidationContext::new(&values, &self.externals);
        let mut updated = Vec::new();
        for (name, field) in self.fields.iter_mut() {
            if field.validate(force, &ctx) {
                updated.push(name.clone());
            }
        }

        for name in updated {
            self.emit(FormEvent::FieldUpdated { name });
        }
    }

    pub fn set_submitted(&mut self, is_submitted: bool) {
        self.is_submitted = is_submitted;
        self.emit(FormEvent::SubmittedChanged { is_submitted });
    }

    /// Live input for a field by name
    pub fn on_change(&mut self, name: &str, raw: impl Into<ScalarValue>) -> Result<()> {
        self.field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?
            .on_change(raw);
        Ok(())
    }

    /// Committed input for a field by name
    pub fn on_blur(&mut self, name: &str, raw: impl Into<ScalarValue>) -> Result<()> {
        self.field_mut(name)
            .ok_or_else(|| FormError::UnknownField(name.to_string()))?
            .on_blur(raw);
        Ok(())
    }

    /// Submit to a handler. See [`FormStore::submit_with`].
    pub fn submit<H: SubmitHandler + ?Sized>(&mut self, handler: &mut H) -> SubmitOutcome {
        self.submit_with(|values| handler.submit(values))
    }

    /// Force-validate all fields, then deliver the snapshot only if no field
    /// is invalid. A rejected submit leaves `is_submitted` unchanged.
    pub fn submit_with<F>(&mut self, on_submit: F) -> SubmitOutcome
    where
        F: FnOnce(&FieldValues),
    {
        self.validate(true);

        if self.is_invalid() {
            let invalid_fields: Vec<String> =
                self.errors().map(|(name, _)| name.to_string()).collect();
            tracing::warn!("Submit rejected, invalid fields: {:?}", invalid_fields);
            return SubmitOutcome::Rejected { invalid_fields };
        }

        let values = self.values();
        on_submit(&values);
        self.set_submitted(true);
        tracing::info!("Form submitted with {} values", values.len());

        SubmitOutcome::Submitted(values)
    }

    /// Register a listener called after every completed mutation
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&FormEvent) + Send + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    fn emit(&mut self, event: FormEvent) {
        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }
    }

    fn field_at(&self, index: usize) -> &FieldStore {
        &self.fields[index]
    }

    fn field_at_mut(&mut self, index: usize) -> &mut FieldStore {
        &mut self.fields[index]
    }

    /// Validate one field against a fresh snapshot of the whole form
    fn validate_at(&mut self, index: usize, force: bool) -> bool {
        if !self.field_at(index).should_validate(force) {
            return false;
        }
        let values = self.values();
        let ctx = ValidationContext::new(&values, &self.externals);
        self.fields[index].validate(force, &ctx)
    }

    fn input_at(&mut self, index: usize, raw: ScalarValue, commit: bool) {
        let field = self.field_at_mut(index);
        if commit {
            field.set_dirty(true);
        }
        field.parse(raw);
        tracing::debug!(
            "Field {} {}: {:?}",
            field.name(),
            if commit { "committed" } else { "changed" },
            field.value()
        );

        self.validate_at(index, false);
        self.notify_field(index);
    }

    fn notify_field(&mut self, index: usize) {
        let name = self.field_at(index).name().to_string();
        self.emit(FormEvent::FieldUpdated { name });
    }
}

impl fmt::Debug for FormStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormStore")
            .field("fields", &self.fields)
            .field("externals", &self.externals)
            .field("is_submitted", &self.is_submitted)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Mutable access to one field of a form.
///
/// Reads go through to the [`FieldStore`]; writes run through the form so
/// validators see the whole form and subscribers are notified.
pub struct FieldHandle<'a> {
    form: &'a mut FormStore,
    index: usize,
}

impl FieldHandle<'_> {
    /// Live input: parse and validate, without marking the field dirty
    pub fn on_change(&mut self, raw: impl Into<ScalarValue>) {
        self.form.input_at(self.index, raw.into(), false);
    }

    /// Committed input: mark dirty, then parse and validate
    pub fn on_blur(&mut self, raw: impl Into<ScalarValue>) {
        self.form.input_at(self.index, raw.into(), true);
    }

    pub fn validate(&mut self, force: bool) {
        if self.form.validate_at(self.index, force) {
            self.form.notify_field(self.index);
        }
    }

    pub fn set_dirty(&mut self, is_dirty: bool) {
        self.form.field_at_mut(self.index).set_dirty(is_dirty);
        self.form.notify_field(self.index);
    }
}

impl Deref for FieldHandle<'_> {
    type Target = FieldStore;

    fn deref(&self) -> &FieldStore {
        self.form.field_at(self.index)
    }
}
