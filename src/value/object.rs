use crate::value::Value;
use serde::{Deserialize, Serialize};

/// An instance of a class: the class name and its named fields in declaration order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Object {
    class: String,
    fields: Vec<(String, Value)>,
}

impl Object {
    /// Class of the objects produced by [`crate::Collection::to_object`].
    pub const PLAIN: &'static str = "object";

    #[inline]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
            fields: vec![],
        }
    }

    /// Creates an empty object of the [`Object::PLAIN`] class.
    #[inline]
    pub fn plain() -> Self {
        Self::new(Self::PLAIN)
    }

    #[inline]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Sets a field, replacing its previous value if there was one.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();

        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some(field) => field.1 = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    #[inline]
    pub fn class(&self) -> &str {
        &self.class
    }

    #[inline]
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> + '_ {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
