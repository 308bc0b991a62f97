//! Bidirectional type-name interner with per-type membership bitmaps.
//!
//! Each shard keeps two of these, one for node types and one for
//! relationship types. Id 0 is the reserved empty type. Ids are assigned
//! monotonically and never recycled; a type whose last member is removed
//! keeps its name binding with an empty bitmap.
//!
//! Type ids must agree across shards, so outside of tests an interner is
//! only grown through the shard-0 broadcast protocol: shard 0 assigns with
//! [`TypeInterner::get_or_insert`], every shard applies the resulting pair
//! with [`TypeInterner::install`].

use std::collections::{BTreeMap, BTreeSet, HashMap};

use roaring::RoaringTreemap;

use crate::types::TypeId;

#[derive(Debug)]
pub struct TypeInterner {
    type_to_id: HashMap<String, TypeId>,
    id_to_type: Vec<String>,
    ids: HashMap<TypeId, RoaringTreemap>,
}

impl Default for TypeInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeInterner {
    pub fn new() -> Self {
        let mut type_to_id = HashMap::new();
        type_to_id.insert(String::new(), 0);
        let mut ids = HashMap::new();
        ids.insert(0, RoaringTreemap::new());
        Self {
            type_to_id,
            id_to_type: vec![String::new()],
            ids,
        }
    }

    /// Id for `name`, or 0 if the name is not interned.
    pub fn type_id(&self, name: &str) -> TypeId {
        self.type_to_id.get(name).copied().unwrap_or(0)
    }

    /// Existing id for `name`, else the next monotonic id.
    pub fn get_or_insert(&mut self, name: &str) -> TypeId {
        if let Some(&id) = self.type_to_id.get(name) {
            return id;
        }
        let id = self.id_to_type.len() as TypeId;
        self.type_to_id.insert(name.to_string(), id);
        self.id_to_type.push(name.to_string());
        self.ids.insert(id, RoaringTreemap::new());
        id
    }

    /// Applies a broadcast `(name, id)` pair. Idempotent for pairs already
    /// present; a conflicting binding is refused.
    pub fn install(&mut self, name: &str, id: TypeId) -> bool {
        if let Some(&existing) = self.type_to_id.get(name) {
            return existing == id;
        }
        if (id as usize) != self.id_to_type.len() {
            return false;
        }
        self.type_to_id.insert(name.to_string(), id);
        self.id_to_type.push(name.to_string());
        self.ids.insert(id, RoaringTreemap::new());
        true
    }

    /// Name for `id`; unknown ids map to the empty type.
    pub fn type_name(&self, id: TypeId) -> &str {
        self.id_to_type
            .get(id as usize)
            .map(String::as_str)
            .unwrap_or("")
    }

    /// A type id is valid once assigned; 0 never is.
    pub fn valid_type_id(&self, id: TypeId) -> bool {
        id > 0 && (id as usize) < self.id_to_type.len()
    }

    pub fn add_id(&mut self, type_id: TypeId, external_id: u64) -> bool {
        if !self.valid_type_id(type_id) {
            return false;
        }
        self.ids.entry(type_id).or_default().insert(external_id);
        true
    }

    pub fn remove_id(&mut self, type_id: TypeId, external_id: u64) -> bool {
        if !self.valid_type_id(type_id) {
            return false;
        }
        self.ids.entry(type_id).or_default().remove(external_id);
        true
    }

    pub fn contains_id(&self, type_id: TypeId, external_id: u64) -> bool {
        self.ids
            .get(&type_id)
            .map(|map| map.contains(external_id))
            .unwrap_or(false)
    }

    /// Membership bitmap for one type id. Invalid ids yield the empty map.
    pub fn ids_of(&self, type_id: TypeId) -> &RoaringTreemap {
        let id = if self.valid_type_id(type_id) { type_id } else { 0 };
        &self.ids[&id]
    }

    /// Union of every type's membership.
    pub fn all_ids(&self) -> RoaringTreemap {
        let mut all = RoaringTreemap::new();
        for map in self.ids.values() {
            all.extend(map.iter());
        }
        all
    }

    pub fn count(&self, type_id: TypeId) -> u64 {
        if !self.valid_type_id(type_id) {
            return 0;
        }
        self.ids.get(&type_id).map(|map| map.len()).unwrap_or(0)
    }

    /// Cardinality per assigned type id, in id order.
    pub fn counts(&self) -> BTreeMap<TypeId, u64> {
        (1..self.id_to_type.len() as TypeId)
            .map(|id| (id, self.count(id)))
            .collect()
    }

    /// Number of assigned types, excluding the reserved empty type.
    pub fn len(&self) -> TypeId {
        (self.id_to_type.len() - 1) as TypeId
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn types(&self) -> BTreeSet<String> {
        self.id_to_type.iter().skip(1).cloned().collect()
    }

    pub fn type_ids(&self) -> BTreeSet<TypeId> {
        (1..self.id_to_type.len() as TypeId).collect()
    }
}
