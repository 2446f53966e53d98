pub mod config;
pub mod iter;

use crate::components::collection::config::{CollectionConfig, ScalarPolicy};
use crate::components::collection::iter::{IntoIter, Iter};
use crate::components::types::{ElementType, TypeRegistry};
use crate::deser::{deserialize_impl, serialize_impl, Codec};
use crate::key::Key;
use crate::traits::keep::Keep;
use crate::value::{Object, Structure, Value};
use crate::Result;
use log::{debug, trace};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::ops::Index;
use std::sync::Arc;

/// Returned by indexing for keys that aren't present.
static NULL: Value = Value::Null;

/// Where a keyless insertion puts its element.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Slot {
    Back,
    Front,
}

/// An ordered key-value container that optionally restricts its object elements to instances of
/// a single class or interface.
///
/// Keys are unique. Entries keep the order they were inserted in, overwriting an existing key
/// keeps its position. Keyless insertions use the next free integer index, which is one above the
/// highest index ever used since the last `clear`, `sort` or `prepend`.
///
/// All mutating methods return `&mut Self` so calls can be chained:
///
/// ```
/// use typed_collection::Collection;
///
/// let mut coll = Collection::new();
/// coll.push(1).unwrap().set("name", "two").unwrap().push(3).unwrap();
/// assert_eq!(coll.len(), 3);
/// ```
#[derive(Clone, Debug)]
pub struct Collection {
    elements: Vec<(Key, Value)>,

    /// Position of each key in `elements`.
    positions: HashMap<Key, usize>,

    /// The key used for the next keyless insertion at the back. `None` once `u64::MAX` is in use.
    next_index: Option<u64>,

    registry: Arc<TypeRegistry>,
    element_type: Option<ElementType>,
    scalars: ScalarPolicy,
}

impl Collection {
    /// Creates an empty, untyped collection using the built-in registry.
    #[inline]
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::shared())
    }

    /// Creates an empty, untyped collection that can resolve element types in `registry`.
    pub fn with_registry(registry: Arc<TypeRegistry>) -> Self {
        Self {
            elements: vec![],
            positions: HashMap::new(),
            next_index: Some(0),
            registry,
            element_type: None,
            scalars: ScalarPolicy::default(),
        }
    }

    /// Creates an empty collection only accepting instances of `class`.
    #[inline]
    pub fn typed(registry: Arc<TypeRegistry>, class: &str) -> Result<Self> {
        Self::with_config(registry, &CollectionConfig::typed(class))
    }

    /// Creates an empty collection configured by `config`.
    pub fn with_config(registry: Arc<TypeRegistry>, config: &CollectionConfig) -> Result<Self> {
        let mut coll = Self::with_registry(registry);
        coll.set_scalar_policy(config.scalars);
        coll.set_class(config.element_type.as_deref())?;
        Ok(coll)
    }

    /// Creates a collection with an optional element type and fills it with `data`. Every entry
    /// is validated like it would be by [`Collection::set`].
    pub fn with_data<I, K, V>(
        data: I,
        registry: Arc<TypeRegistry>,
        class: Option<&str>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        let mut coll = Self::with_registry(registry);
        coll.set_class(class)?.set_batch(data)?;
        Ok(coll)
    }

    /// Creates an untyped collection holding the entries of `structure`.
    pub fn from_structure(structure: Structure) -> Self {
        let mut coll = Self::new();
        for (k, v) in structure {
            coll.insert_at(k, v);
        }
        coll
    }

    /// Sets or removes the element type. Fails with [`crate::Error::Configuration`] if `class`
    /// is not known to the registry.
    ///
    /// Elements already stored are not checked again.
    pub fn set_class(&mut self, class: Option<&str>) -> Result<&mut Self> {
        self.element_type = match class {
            Some(name) => {
                let ty = ElementType::resolve(&self.registry, name)?;
                debug!("Collection restricted to instances of {name}");
                Some(ty)
            }
            None => None,
        };
        Ok(self)
    }

    #[inline]
    pub fn set_scalar_policy(&mut self, scalars: ScalarPolicy) -> &mut Self {
        self.scalars = scalars;
        self
    }

    /// Returns the name of the configured element type.
    #[inline]
    pub fn element_type(&self) -> Option<&str> {
        self.element_type.as_ref().map(ElementType::name)
    }

    #[inline]
    pub fn scalar_policy(&self) -> ScalarPolicy {
        self.scalars
    }

    #[inline]
    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }
}

impl Collection {
    /// Inserts `value` at `key`, replacing the previous value if the key already exists.
    #[inline]
    pub fn set(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Result<&mut Self> {
        self.do_set(Some(key.into()), value.into(), Slot::Back)
    }

    /// Like [`Collection::set`] but appends the value if there is no key.
    #[inline]
    pub fn set_or_push(&mut self, key: Option<Key>, value: impl Into<Value>) -> Result<&mut Self> {
        self.do_set(key, value.into(), Slot::Back)
    }

    /// Sets all entries in the order they're yielded. Entries before a rejected one stay inserted.
    pub fn set_batch<I, K, V>(&mut self, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Key>,
        V: Into<Value>,
    {
        for (k, v) in entries {
            self.set(k, v)?;
        }
        Ok(self)
    }

    /// Appends `value` at the next free index. Fails with [`crate::Error::IndexExhausted`] if
    /// `u64::MAX` is already in use.
    #[inline]
    pub fn push(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.do_set(None, value.into(), Slot::Back)
    }

    /// Same as [`Collection::push`].
    #[inline]
    pub fn add(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(value)
    }

    /// Same as [`Collection::push`].
    #[inline]
    pub fn append(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.push(value)
    }

    /// Inserts `value` at the front with index 0. All other indices get renumbered in order,
    /// named keys are kept.
    #[inline]
    pub fn prepend(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        self.do_set(None, value.into(), Slot::Front)
    }

    /// Removes the entry at `key`. Does nothing if there is none.
    pub fn remove(&mut self, key: impl Into<Key>) -> &mut Self {
        if let Some(pos) = self.positions.remove(&key.into()) {
            self.elements.remove(pos);
            self.reindex_from(pos);
        }
        self
    }

    pub fn clear(&mut self) -> &mut Self {
        self.elements.clear();
        self.positions.clear();
        self.next_index = Some(0);
        self
    }

    /// Sorts the values with `compare`. The sort is stable. Keys are discarded and the sorted
    /// values get indexed from 0.
    pub fn sort_by<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        let mut values: Vec<Value> = self.elements.drain(..).map(|(_, v)| v).collect();
        values.sort_by(|a, b| compare(a, b));

        self.elements = values
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Index(i as u64), v))
            .collect();
        self.next_index = Some(self.elements.len() as u64);
        self.reindex_from(0);
        self
    }

    /// Sorts the entries by their values with `compare`, keeping each value's key.
    pub fn sort_by_preserving_keys<F>(&mut self, mut compare: F) -> &mut Self
    where
        F: FnMut(&Value, &Value) -> Ordering,
    {
        self.elements.sort_by(|a, b| compare(&a.1, &b.1));
        self.reindex_from(0);
        self
    }

    /// Validates and inserts a single value.
    fn do_set(&mut self, key: Option<Key>, value: Value, slot: Slot) -> Result<&mut Self> {
        self.validate(&value)?;

        match (key, slot) {
            (Some(key), _) => self.insert_at(key, value),
            (None, Slot::Back) => {
                let index = self.next_index.ok_or(crate::Error::IndexExhausted)?;
                self.insert_at(Key::Index(index), value);
            }
            (None, Slot::Front) => self.unshift(value),
        }

        Ok(self)
    }

    /// Checks `value` against the element type.
    fn validate(&self, value: &Value) -> Result<()> {
        let Some(ty) = &self.element_type else {
            return Ok(());
        };

        let accepted = if value.is_object() {
            self.registry.is_instance(value, ty.handle())
        } else {
            self.scalars == ScalarPolicy::Allow
        };

        if accepted {
            return Ok(());
        }

        trace!("Rejecting {} in collection of {}", value.type_name(), ty.name());
        Err(crate::Error::invalid_element(ty.name(), value.type_name()))
    }

    /// Inserts without validation.
    fn insert_at(&mut self, key: Key, value: Value) {
        if let Some(&pos) = self.positions.get(&key) {
            self.elements[pos].1 = value;
            return;
        }

        if let Key::Index(i) = key {
            self.next_index = match (self.next_index, i.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }

        self.positions.insert(key.clone(), self.elements.len());
        self.elements.push((key, value));
    }

    /// Inserts `value` at index 0 and renumbers all following indices.
    fn unshift(&mut self, value: Value) {
        let mut elements = Vec::with_capacity(self.elements.len() + 1);
        elements.push((Key::Index(0), value));

        let mut next = 1;
        for (k, v) in self.elements.drain(..) {
            let key = match k {
                Key::Index(_) => {
                    next += 1;
                    Key::Index(next - 1)
                }
                name => name,
            };
            elements.push((key, v));
        }

        self.elements = elements;
        self.next_index = Some(next);
        self.reindex_from(0);
    }

    /// Updates the stored positions of all entries starting at `start`.
    fn reindex_from(&mut self, start: usize) {
        if start == 0 {
            self.positions.clear();
        }

        for (pos, (k, _)) in self.elements.iter().enumerate().skip(start) {
            self.positions.insert(k.clone(), pos);
        }
    }
}

impl Collection {
    #[inline]
    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let pos = *self.positions.get(&key.into())?;
        Some(&self.elements[pos].1)
    }

    /// Returns the value at `key` or `default` if there is none.
    #[inline]
    pub fn get_or<'a>(&'a self, key: impl Into<Key>, default: &'a Value) -> &'a Value {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if there is an entry at `key`.
    #[inline]
    pub fn has(&self, key: impl Into<Key>) -> bool {
        self.positions.contains_key(&key.into())
    }

    /// Returns `true` if any stored value equals `value`.
    #[inline]
    pub fn contains(&self, value: &Value) -> bool {
        self.values().any(|v| v == value)
    }

    /// Returns the key of the first value equal to `value`.
    #[inline]
    pub fn index_of(&self, value: &Value) -> Option<&Key> {
        self.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }

    /// Returns all entries, or only those whose key is in `keys` if it isn't empty. The result is
    /// in the order of the collection, not of `keys`.
    pub fn all(&self, keys: &[Key]) -> Structure {
        if keys.is_empty() {
            return Structure::from_unique(self.elements.clone());
        }

        let keys: HashSet<&Key> = keys.iter().collect();
        let entries = self
            .elements
            .iter()
            .filter(|(k, _)| keys.contains(k))
            .cloned()
            .collect();
        Structure::from_unique(entries)
    }

    #[inline]
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &Key> + ExactSizeIterator + '_ {
        self.elements.iter().map(|(k, _)| k)
    }

    #[inline]
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &Value> + ExactSizeIterator + '_ {
        self.elements.iter().map(|(_, v)| v)
    }

    #[inline]
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(&self.elements)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Same as [`Collection::len`].
    #[inline]
    pub fn count(&self) -> usize {
        self.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        !self.is_not_empty()
    }

    #[inline]
    pub fn is_not_empty(&self) -> bool {
        self.exists()
    }

    #[inline]
    pub fn exists(&self) -> bool {
        self.len() > 0
    }
}

impl Collection {
    /// Calls `f` for every entry in order.
    pub fn each<F>(&self, mut f: F) -> &Self
    where
        F: FnMut(&Key, &Value),
    {
        for (k, v) in self.iter() {
            f(k, v);
        }
        self
    }

    /// Returns a new untyped collection with every value transformed by `f`, keeping the keys.
    #[inline]
    pub fn map<F, V>(&self, mut f: F) -> Collection
    where
        F: FnMut(&Value) -> V,
        V: Into<Value>,
    {
        let mut coll = self.derived();
        for (k, v) in self.iter() {
            coll.insert_at(k.clone(), f(v).into());
        }
        coll
    }

    /// Like [`Collection::map`] but the new key of every entry is computed by `key_fn` from the
    /// original value. A `None` key appends the value like [`Collection::push`]. Entries mapped
    /// to the same key overwrite each other.
    pub fn map_with_keys<F, V, KF, K>(&self, mut f: F, mut key_fn: KF) -> Result<Collection>
    where
        F: FnMut(&Value) -> V,
        V: Into<Value>,
        KF: FnMut(&Value) -> Option<K>,
        K: Into<Key>,
    {
        let mut coll = self.derived();
        for v in self.values() {
            let key = key_fn(v).map(Into::into);
            coll.set_or_push(key, f(v))?;
        }
        Ok(coll)
    }

    /// Returns a new untyped collection with the entries for which `predicate` doesn't return
    /// exactly `false`. See [`Keep`].
    pub fn filter<F, P>(&self, mut predicate: F) -> Collection
    where
        F: FnMut(&Value, &Key) -> P,
        P: Keep,
    {
        let mut coll = self.derived();
        for (k, v) in self.iter() {
            if predicate(v, k).keep() {
                coll.insert_at(k.clone(), v.clone());
            }
        }
        coll
    }

    /// An empty, untyped collection sharing this collection's registry.
    #[inline]
    fn derived(&self) -> Collection {
        Collection::with_registry(self.registry.clone())
    }
}

impl Collection {
    /// Converts the collection into a plain object with a field per entry. Nested collections
    /// are converted too, all other values are cloned as they are.
    pub fn to_object(&self) -> Object {
        let mut object = Object::plain();
        for (k, v) in self.iter() {
            let value = match v {
                Value::Collection(c) => Value::Object(c.to_object()),
                other => other.clone(),
            };
            object.set(k.to_string(), value);
        }
        object
    }

    /// Converts the collection into its array-like form. Nested collections are converted too,
    /// all other values are cloned as they are.
    pub fn to_array(&self) -> Structure {
        let entries = self
            .iter()
            .map(|(k, v)| {
                let value = match v {
                    Value::Collection(c) => Value::Array(c.to_array()),
                    other => other.clone(),
                };
                (k.clone(), value)
            })
            .collect();
        Structure::from_unique(entries)
    }

    /// Encodes the array-like form as JSON.
    #[inline]
    pub fn to_text(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_array())?)
    }

    /// Decodes JSON written by [`Collection::to_text`] and sets all its entries.
    pub fn restore_text(&mut self, text: &str) -> Result<&mut Self> {
        let structure: Structure = serde_json::from_str(text)?;
        debug!("Restoring {} entries from text", structure.len());
        self.set_batch(structure)
    }

    /// Encodes the array-like form with the default codec.
    #[inline]
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize_impl(&self.to_array())
    }

    /// Decodes data written by [`Collection::serialize`] and sets all its entries. Entries are
    /// validated against the element type.
    pub fn deserialize(&mut self, data: &[u8]) -> Result<&mut Self> {
        let structure: Structure = deserialize_impl(data)?;
        debug!("Restoring {} entries", structure.len());
        self.set_batch(structure)
    }

    /// Encodes the array-like form with the codec `C`.
    #[inline]
    pub fn serialize_with<C: Codec>(&self) -> Result<Vec<u8>> {
        C::encode(&self.to_array())
    }

    /// Decodes data written by [`Collection::serialize_with`] using the same codec.
    pub fn deserialize_with<C: Codec>(&mut self, data: &[u8]) -> Result<&mut Self> {
        let structure: Structure = C::decode(data)?;
        debug!("Restoring {} entries", structure.len());
        self.set_batch(structure)
    }
}

impl Default for Collection {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Collection {
    /// Structural equality of the entries. The element type is configuration and isn't part of
    /// the array-like form, so it is ignored.
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.elements == other.elements
    }
}

impl<K: Into<Key>> Index<K> for Collection {
    type Output = Value;

    /// Returns `Value::Null` for missing keys.
    #[inline]
    fn index(&self, key: K) -> &Self::Output {
        self.get(key).unwrap_or(&NULL)
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = (&'a Key, &'a Value);
    type IntoIter = Iter<'a>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl IntoIterator for Collection {
    type Item = (Key, Value);
    type IntoIter = IntoIter;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self.elements)
    }
}

impl<V: Into<Value>> FromIterator<V> for Collection {
    /// Collects into an untyped collection, appending every value.
    fn from_iter<T: IntoIterator<Item = V>>(iter: T) -> Self {
        let mut coll = Collection::new();
        coll.extend(iter);
        coll
    }
}

impl<V: Into<Value>> Extend<V> for Collection {
    /// Appends every value.
    ///
    /// # Panics
    /// Panics if a value is rejected by the element type. Use [`Collection::push`] to handle that.
    fn extend<T: IntoIterator<Item = V>>(&mut self, iter: T) {
        for v in iter {
            self.push(v).expect("Failed to insert");
        }
    }
}

impl Serialize for Collection {
    /// Serializes the array-like form.
    #[inline]
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_array().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Collection {
    /// Deserializes into an untyped collection.
    #[inline]
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        Ok(Collection::from_structure(Structure::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::components::types::test::make_zoo;
    use crate::components::types::COLLECTION_CLASS;
    use crate::deser::Bincode;
    use crate::Error;

    fn make_animals() -> Collection {
        Collection::typed(make_zoo(), "Animal").unwrap()
    }

    fn make_abc() -> Collection {
        let mut coll = Collection::new();
        coll.push("a").unwrap().push("b").unwrap().push("c").unwrap();
        coll
    }

    fn keys(coll: &Collection) -> Vec<Key> {
        coll.keys().cloned().collect()
    }

    fn idx(i: &[u64]) -> Vec<Key> {
        i.iter().map(|i| Key::Index(*i)).collect()
    }

    #[test]
    fn type_enforcement() {
        let mut animals = make_animals();

        animals.push(Object::new("Dog")).unwrap();
        animals.push(Object::new("Animal")).unwrap();

        let err = animals.push(Object::new("Car")).err();
        assert_eq!(err, Some(Error::invalid_element("Animal", "Car")));

        let err = animals.prepend(Object::new("Car")).err();
        assert_eq!(err, Some(Error::invalid_element("Animal", "Car")));

        let err = animals.set("x", Collection::new()).err();
        assert_eq!(err, Some(Error::invalid_element("Animal", COLLECTION_CLASS)));

        assert_eq!(animals.len(), 2);
    }

    #[test]
    fn interface_constraint() {
        let mut pets = Collection::typed(make_zoo(), "Named").unwrap();
        pets.set("rex", Object::new("Dog")).unwrap();
        assert!(pets.set("mittens", Object::new("Mammal")).is_err());
        assert_eq!(pets.element_type(), Some("Named"));
    }

    #[test]
    fn scalars_bypass_check() {
        let mut animals = make_animals();
        animals
            .push(1)
            .unwrap()
            .push("dog")
            .unwrap()
            .push(Value::Null)
            .unwrap()
            .push(Structure::new())
            .unwrap();
        assert_eq!(animals.len(), 4);
    }

    #[test]
    fn scalars_rejected() {
        let config = CollectionConfig::typed("Animal").with_scalars(ScalarPolicy::Reject);
        let mut animals = Collection::with_config(make_zoo(), &config).unwrap();

        assert_eq!(
            animals.push(1).err(),
            Some(Error::invalid_element("Animal", "int"))
        );
        assert_eq!(
            animals.push("x").err(),
            Some(Error::invalid_element("Animal", "string"))
        );
        animals.push(Object::new("Dog")).unwrap();

        // Without an element type the policy has no effect.
        animals.set_class(None).unwrap();
        animals.push(1).unwrap();
        assert_eq!(animals.len(), 2);
    }

    #[test]
    fn unknown_class() {
        assert_eq!(
            Collection::typed(make_zoo(), "Plant").err(),
            Some(Error::configuration("Plant"))
        );

        let mut coll = Collection::new();
        assert_eq!(
            coll.set_class(Some("Animal")).err(),
            Some(Error::configuration("Animal"))
        );
        assert_eq!(coll.element_type(), None);
    }

    #[test]
    fn construct_with_data() {
        let data = Structure::new()
            .with("rex", Object::new("Dog"))
            .with("age", 3);
        let coll = Collection::with_data(data, make_zoo(), Some("Animal")).unwrap();
        assert_eq!(coll.len(), 2);
        assert_eq!(coll["age"], Value::Int(3));

        let data = vec![("a", Value::from(Object::new("Car")))];
        assert!(Collection::with_data(data, make_zoo(), Some("Animal")).is_err());
    }

    #[test]
    fn push_order() {
        let coll = make_abc();
        assert_eq!(keys(&coll), idx(&[0, 1, 2]));
        let values: Vec<_> = coll.all(&[]).into_iter().map(|(_, v)| v).collect();
        assert_eq!(
            values,
            vec![Value::from("a"), Value::from("b"), Value::from("c")]
        );
    }

    #[test]
    fn overwrite() {
        let mut coll = Collection::new();
        coll.set("x", 1).unwrap().set("y", 2).unwrap().set("x", 3).unwrap();
        assert_eq!(coll.count(), 2);
        assert_eq!(coll.get("x"), Some(&Value::Int(3)));
        assert_eq!(keys(&coll), vec![Key::from("x"), Key::from("y")]);
    }

    #[test]
    fn next_index() {
        let mut coll = Collection::new();
        coll.set(5, "five").unwrap().push("six").unwrap();
        assert!(coll.has(6));

        // Removing doesn't free the index.
        coll.remove(6).push("seven").unwrap();
        assert!(coll.has(7));
        assert!(!coll.has(6));

        coll.set("10", "ten").unwrap().push("eleven").unwrap();
        assert_eq!(coll.get(11), Some(&Value::from("eleven")));

        coll.clear().push("zero").unwrap();
        assert_eq!(keys(&coll), idx(&[0]));

        coll.set_or_push(None, "one").unwrap();
        coll.set_or_push(Some(Key::from("k")), "k").unwrap();
        assert_eq!(keys(&coll), vec![Key::Index(0), Key::Index(1), Key::from("k")]);
    }

    #[test]
    fn prepend_renumbers() {
        let mut coll = Collection::new();
        coll.set(3, "a").unwrap().set("name", "b").unwrap().push("c").unwrap();
        coll.prepend("first").unwrap();

        assert_eq!(
            keys(&coll),
            vec![Key::Index(0), Key::Index(1), Key::from("name"), Key::Index(2)]
        );
        assert_eq!(coll[0], Value::from("first"));
        assert_eq!(coll[1], Value::from("a"));
        assert_eq!(coll["name"], Value::from("b"));

        coll.push("d").unwrap();
        assert_eq!(coll[3], Value::from("d"));
    }

    #[test]
    fn remove_and_lookup() {
        let mut coll = make_abc();
        coll.remove(1).remove(42).remove("missing");
        assert_eq!(keys(&coll), idx(&[0, 2]));
        assert_eq!(coll.get(2), Some(&Value::from("c")));
        assert_eq!(coll.get(1), None);
        assert_eq!(coll[1], Value::Null);

        let default = Value::from("default");
        assert_eq!(coll.get_or(1, &default), &default);
        assert_eq!(coll.get_or(0, &default), &Value::from("a"));
    }

    #[test]
    fn empty_ops() {
        let mut coll = Collection::new();
        assert!(coll.is_empty());
        assert!(!coll.exists());
        coll.clear().clear();
        assert_eq!(coll.count(), 0);
        coll.sort_by(|_, _| Ordering::Equal);
        assert!(coll.is_empty());

        coll.push(1).unwrap();
        assert!(coll.is_not_empty());
        assert!(coll.exists());
    }

    #[test]
    fn contains_and_index_of() {
        let mut coll = make_abc();
        coll.set("dog", Object::new("Dog").with("name", "rex")).unwrap();

        assert!(coll.contains(&Value::from("b")));
        assert!(!coll.contains(&Value::from("z")));
        assert!(coll.contains(&Object::new("Dog").with("name", "rex").into()));
        assert!(!coll.contains(&Object::new("Dog").with("name", "max").into()));

        assert_eq!(coll.index_of(&Value::from("c")), Some(&Key::Index(2)));
        assert_eq!(
            coll.index_of(&Object::new("Dog").with("name", "rex").into()),
            Some(&Key::from("dog"))
        );
        assert_eq!(coll.index_of(&Value::from(1)), None);
    }

    #[test]
    fn all_subset_keeps_order() {
        let mut coll = Collection::new();
        coll.set("a", 1).unwrap().set("b", 2).unwrap().set("c", 3).unwrap();

        let sub = coll.all(&[Key::from("c"), Key::from("a"), Key::from("zzz")]);
        let sub_keys: Vec<_> = sub.keys().cloned().collect();
        assert_eq!(sub_keys, vec![Key::from("a"), Key::from("c")]);
        assert_eq!(coll.all(&[]).len(), 3);
    }

    #[test]
    fn each_visits_in_order() {
        let coll = make_abc();
        let mut seen = vec![];
        coll.each(|k, v| seen.push((k.clone(), v.clone())))
            .each(|_, _| {});
        assert_eq!(seen.len(), 3);
        assert_eq!(seen[2], (Key::Index(2), Value::from("c")));
    }

    #[test]
    fn map_is_untyped() {
        let mut animals = make_animals();
        animals.set("rex", Object::new("Dog")).unwrap();
        animals.set("max", Object::new("Dog")).unwrap();

        let cars = animals.map(|_| Object::new("Car"));
        assert_eq!(cars.element_type(), None);
        assert_eq!(cars.len(), 2);
        assert_eq!(cars["rex"], Value::from(Object::new("Car")));

        let by_class = animals
            .map_with_keys(|_| 1, |v| Some(v.type_name().to_string()))
            .unwrap();
        assert_eq!(keys(&by_class), vec![Key::from("Dog")]);
    }

    #[test]
    fn map_without_keys_appends() {
        let mut coll = Collection::new();
        coll.set("a", 1).unwrap().set("b", 2).unwrap().set("c", 3).unwrap();

        let mapped = coll
            .map_with_keys(
                |v| v.clone(),
                |v| (v.as_int() == Some(2)).then(|| "two".to_string()),
            )
            .unwrap();
        assert_eq!(
            keys(&mapped),
            vec![Key::Index(0), Key::from("two"), Key::Index(1)]
        );
        assert_eq!(mapped[1], Value::Int(3));
    }

    #[test]
    fn map_without_keys_exhausted() {
        let mut coll = Collection::new();
        coll.set(u64::MAX, 1).unwrap().set("x", 2).unwrap();

        let res = coll.map_with_keys(|v| v.clone(), |v| v.as_int().map(|_| u64::MAX));
        assert_eq!(res.err(), None);

        let res = coll.map_with_keys(
            |v| v.clone(),
            |v| (v.as_int() == Some(1)).then_some(u64::MAX),
        );
        assert_eq!(res.err(), Some(Error::IndexExhausted));
    }

    #[test]
    fn filter_strict_false() {
        let mut coll = Collection::new();
        coll.set("a", 1).unwrap().set("b", 2).unwrap();

        let filtered = coll.filter(|v, _| v.as_int().is_some_and(|i| i > 1));
        assert_eq!(filtered.to_array(), Structure::new().with("b", 2));

        // Zero isn't false.
        let kept = coll.filter(|_, _| 0i64);
        assert_eq!(kept.len(), 2);

        let kept = coll.filter(|_, _| Value::Int(0));
        assert_eq!(kept.len(), 2);

        let none = coll.filter(|_, _| Value::Bool(false));
        assert!(none.is_empty());

        let by_key = coll.filter(|_, k| *k == Key::from("a"));
        assert_eq!(keys(&by_key), vec![Key::from("a")]);
    }

    #[test]
    fn filter_drops_type() {
        let mut animals = make_animals();
        animals.push(Object::new("Dog")).unwrap();
        let mut filtered = animals.filter(|_, _| true);
        assert_eq!(filtered.element_type(), None);
        filtered.push(Object::new("Car")).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn sort_reindexes() {
        let mut coll = Collection::new();
        coll.set("x", 3).unwrap().set("y", 1).unwrap().set(9, 2).unwrap();
        coll.sort_by(|a, b| a.as_int().cmp(&b.as_int()));

        assert_eq!(keys(&coll), idx(&[0, 1, 2]));
        assert_eq!(coll[0], Value::Int(1));
        assert_eq!(coll[2], Value::Int(3));

        coll.push(4).unwrap();
        assert!(coll.has(3));
    }

    #[test]
    fn sort_preserving_keys() {
        let mut coll = Collection::new();
        coll.set("x", 3).unwrap().set("y", 1).unwrap().set(9, 2).unwrap();
        coll.sort_by_preserving_keys(|a, b| a.as_int().cmp(&b.as_int()));

        assert_eq!(keys(&coll), vec![Key::from("y"), Key::Index(9), Key::from("x")]);
        assert_eq!(coll["x"], Value::Int(3));
        coll.remove("y");
        assert_eq!(coll[9], Value::Int(2));
    }

    #[test]
    fn to_object_recurses() {
        let mut inner = Collection::new();
        inner.set("deep", true).unwrap();

        let mut coll = Collection::new();
        coll.push(1)
            .unwrap()
            .set("inner", inner)
            .unwrap()
            .set("arr", Structure::new().with("k", Collection::new()))
            .unwrap();

        let object = coll.to_object();
        assert_eq!(object.class(), Object::PLAIN);
        assert_eq!(object.get("0"), Some(&Value::Int(1)));
        assert_eq!(
            object.get("inner"),
            Some(&Value::Object(Object::plain().with("deep", true)))
        );
        // Non collection containers stay untouched.
        assert_eq!(
            object.get("arr"),
            Some(&Value::from(Structure::new().with("k", Collection::new())))
        );
    }

    #[test]
    fn to_array_recurses() {
        let mut inner = Collection::new();
        inner.push("x").unwrap();

        let mut coll = Collection::new();
        coll.set("inner", inner).unwrap().set("n", 2).unwrap();

        let expected = Structure::new()
            .with("inner", Structure::new().with(0, "x"))
            .with("n", 2);
        assert_eq!(coll.to_array(), expected);
    }

    fn make_mixed() -> Collection {
        let mut inner = Collection::new();
        inner.push(1.5).unwrap().set("s", "str").unwrap();

        let mut coll = Collection::new();
        coll.set("rex", Object::new("Dog").with("age", 4))
            .unwrap()
            .push(Value::Null)
            .unwrap()
            .set("inner", inner)
            .unwrap()
            .push(false)
            .unwrap()
            .push(-12)
            .unwrap();
        coll
    }

    #[test]
    fn binary_round_trip() {
        let coll = make_mixed();

        let data = coll.serialize().unwrap();
        let mut restored = Collection::new();
        restored.deserialize(&data).unwrap();
        assert_eq!(restored.to_array(), coll.to_array());

        let data = coll.serialize_with::<Bincode>().unwrap();
        let mut restored = Collection::new();
        restored.deserialize_with::<Bincode>(&data).unwrap();
        assert_eq!(restored.to_array(), coll.to_array());
    }

    #[test]
    fn text_round_trip() {
        let coll = make_mixed();
        let text = coll.to_text().unwrap();

        let mut restored = Collection::new();
        restored.restore_text(&text).unwrap();
        assert_eq!(restored.to_array(), coll.to_array());

        assert!(matches!(
            Collection::new().restore_text("not json"),
            Err(Error::Json(..))
        ));
    }

    #[test]
    fn restore_validates() {
        let mut coll = Collection::new();
        coll.set("car", Object::new("Car")).unwrap();
        let data = coll.serialize().unwrap();

        let mut animals = make_animals();
        assert_eq!(
            animals.deserialize(&data).err(),
            Some(Error::invalid_element("Animal", "Car"))
        );
        assert!(animals.is_empty());
    }

    #[test]
    fn restore_augments() {
        let mut coll = make_abc();
        let data = coll.serialize().unwrap();

        let mut other = Collection::new();
        other.set("z", 26).unwrap().set(1, "old").unwrap();
        other.deserialize(&data).unwrap();

        assert_eq!(
            keys(&other),
            vec![Key::from("z"), Key::Index(1), Key::Index(0), Key::Index(2)]
        );
        assert_eq!(other[1], Value::from("b"));

        assert!(matches!(coll.deserialize(&[]), Err(Error::Bitcode(..))));
        assert_eq!(coll.len(), 3);
    }

    #[test]
    fn serde_impl() {
        let coll = make_mixed();
        let json = serde_json::to_string(&coll).unwrap();
        assert_eq!(json, coll.to_text().unwrap());

        let back: Collection = serde_json::from_str(&json).unwrap();
        assert_eq!(back.element_type(), None);
        assert_eq!(back.to_array(), coll.to_array());
    }

    #[test]
    fn collect_and_extend() {
        let mut coll: Collection = vec![1, 2].into_iter().collect();
        coll.extend(["x", "y"]);
        assert_eq!(keys(&coll), idx(&[0, 1, 2, 3]));

        let total: i64 = (&coll).into_iter().filter_map(|(_, v)| v.as_int()).sum();
        assert_eq!(total, 3);
    }

    #[test]
    #[should_panic]
    fn extend_rejects() {
        let mut animals = make_animals();
        animals.extend([Object::new("Car")]);
    }

    #[test]
    fn equality() {
        assert_eq!(make_abc(), make_abc());

        // The element type doesn't take part in comparisons.
        let mut other = make_abc();
        other.set_class(Some(COLLECTION_CLASS)).unwrap();
        assert_eq!(make_abc(), other);

        other.push("d").unwrap();
        assert_ne!(make_abc(), other);
    }

    #[test]
    fn push_after_max_index() {
        let mut coll = Collection::new();
        coll.set(u64::MAX, "max").unwrap();

        assert_eq!(coll.push("pushed").err(), Some(Error::IndexExhausted));
        assert_eq!(coll.len(), 1);
        assert_eq!(coll[u64::MAX], Value::from("max"));

        // Explicit keys still work, and so does prepending.
        coll.set("name", "n").unwrap();
        coll.prepend("first").unwrap();
        assert_eq!(keys(&coll), vec![Key::Index(0), Key::Index(1), Key::from("name")]);
        coll.push("again").unwrap();
        assert!(coll.has(2));

        coll.clear().set(u64::MAX - 1, "almost").unwrap();
        coll.push("last").unwrap();
        assert_eq!(coll[u64::MAX], Value::from("last"));
        assert_eq!(coll.push("over").err(), Some(Error::IndexExhausted));
        assert_eq!(coll.len(), 2);
    }

    #[test]
    fn nested_typed_round_trip() {
        let mut animals = make_animals();
        animals.set("rex", Object::new("Dog")).unwrap();

        let mut coll = Collection::new();
        coll.set("arr", Structure::new().with("c", animals)).unwrap();

        let data = coll.serialize().unwrap();
        let mut restored = Collection::new();
        restored.deserialize(&data).unwrap();
        assert_eq!(restored.to_array(), coll.to_array());

        let mut restored = Collection::new();
        restored.restore_text(&coll.to_text().unwrap()).unwrap();
        assert_eq!(restored.to_array(), coll.to_array());
    }
}
