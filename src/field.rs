//! Validated editor fields.
//!
//! A [`ValidatedField`] holds a value together with its default and the
//! [`Domain`] it must belong to. Invalid values are stored as typed so the
//! user can keep editing; the field reports the problem through
//! [`ValidatedField::error`] instead of rejecting the edit.

use std::fmt::Display;

/// The set of legal values for a field.
pub trait Domain<T> {
    /// Returns a message describing why `value` is not legal.
    fn check(&self, value: &T) -> Result<(), String>;
}

/// Inclusive integer range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    pub min: usize,
    pub max: usize,
}

impl Bounds {
    pub fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }
}

impl Domain<usize> for Bounds {
    fn check(&self, value: &usize) -> Result<(), String> {
        if *value < self.min || *value > self.max {
            Err(format!("must be in the range [{}, {}]", self.min, self.max))
        } else {
            Ok(())
        }
    }
}

/// A fixed list of choices, as offered by a select box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Choices<T>(pub Vec<T>);

impl<T: PartialEq + Display> Domain<T> for Choices<T> {
    fn check(&self, value: &T) -> Result<(), String> {
        if self.0.contains(value) {
            Ok(())
        } else {
            let options = self.0.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            Err(format!("must be one of {}", options))
        }
    }
}

/// A value with its default and its domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedField<T, D> {
    label: &'static str,
    value: T,
    default: T,
    domain: D,
}

impl<T: Clone, D: Domain<T>> ValidatedField<T, D> {
    pub fn new(label: &'static str, default: T, domain: D) -> Self {
        Self {
            label,
            value: default.clone(),
            default,
            domain,
        }
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn default_value(&self) -> &T {
        &self.default
    }

    pub fn domain(&self) -> &D {
        &self.domain
    }

    /// Stores `value`, even if it lies outside the domain.
    pub fn set(&mut self, value: T) {
        self.value = value;
    }

    /// Replaces the domain; the current value is checked against it from now
    /// on.
    pub fn set_domain(&mut self, domain: D) {
        self.domain = domain;
    }

    /// Sets both the value and the default.
    pub fn set_default(&mut self, default: T) {
        self.default = default.clone();
        self.value = default;
    }

    /// Restores the default value.
    pub fn reset(&mut self) {
        self.value = self.default.clone();
    }

    pub fn is_valid(&self) -> bool {
        self.domain.check(&self.value).is_ok()
    }

    /// Field-level message for the current value, if it is not legal.
    pub fn error(&self) -> Option<String> {
        self.domain
            .check(&self.value)
            .err()
            .map(|reason| format!("{} {}", self.label, reason))
    }
}
