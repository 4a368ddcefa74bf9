//! The module contains `Material`, its table, and the bookkeeping of the
//! material ↔ method association.
//!
//! In the store the association lives on a single column,
//! `material_method.material_id`, and the method set of a material is read
//! back by query. In memory a `Material` owns its methods and every method
//! carries a [`MaterialRef`] back to it. The three relationship operations
//! below are the only way to change either side, so both stay consistent.

use std::sync::atomic::{AtomicU64, Ordering};

use sea_orm::entity::prelude::*;

use crate::{MaterialMethod, ResultEngine, material_methods};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// A material.
///
/// Fields are only reachable through accessors: every setter refreshes the
/// back-reference of the current members.
#[derive(Clone, Debug)]
pub struct Material {
    id: Option<i64>,
    name: Option<String>,
    description: Option<String>,
    methods: Vec<MaterialMethod>,
    /// In-memory identity, shared by clones. Lets a method recognise an owner
    /// that has no id yet.
    key: u64,
}

impl Default for Material {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl Material {
    /// Properties accepted in a sort criterion.
    pub const SORTABLE: &'static [&'static str] = &["id", "name", "description"];

    pub fn new(name: Option<String>, description: Option<String>) -> Self {
        Self {
            id: None,
            name,
            description,
            methods: Vec::new(),
            key: NEXT_KEY.fetch_add(1, Ordering::Relaxed),
        }
    }

    pub fn with_id(id: i64, name: Option<String>, description: Option<String>) -> Self {
        Self {
            id: Some(id),
            ..Self::new(name, description)
        }
    }

    /// Assigned by the store on first persist.
    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_id(&mut self, id: Option<i64>) -> &mut Self {
        self.id = id;
        self.refresh_members()
    }

    pub fn set_name(&mut self, name: Option<String>) -> &mut Self {
        self.name = name;
        self.refresh_members()
    }

    pub fn set_description(&mut self, description: Option<String>) -> &mut Self {
        self.description = description;
        self.refresh_members()
    }

    pub fn methods(&self) -> &[MaterialMethod] {
        &self.methods
    }

    /// Insert `method` into the set and point its back-reference here.
    ///
    /// A method equal to one already in the set replaces it.
    pub fn add_method(&mut self, mut method: MaterialMethod) -> &mut Self {
        method.material = Some(self.to_ref());
        match self.methods.iter().position(|m| *m == method) {
            Some(index) => self.methods[index] = method,
            None => self.methods.push(method),
        }
        self
    }

    /// Remove `method` from the set, returning it with its back-reference
    /// cleared. Returns `None` when `method` was not a member.
    pub fn remove_method(&mut self, method: &MaterialMethod) -> Option<MaterialMethod> {
        let index = self.methods.iter().position(|m| m == method)?;
        let mut removed = self.methods.remove(index);
        removed.material = None;
        Some(removed)
    }

    /// Replace the whole set.
    ///
    /// Every current member loses its back-reference, then every member of
    /// `methods` is adopted. Previous members that are not part of the new
    /// set are returned detached.
    pub fn set_methods<I>(&mut self, methods: I) -> Vec<MaterialMethod>
    where
        I: IntoIterator<Item = MaterialMethod>,
    {
        let mut previous = std::mem::take(&mut self.methods);
        for method in &mut previous {
            method.material = None;
        }
        for method in methods {
            self.add_method(method);
        }
        previous.retain(|old| !self.methods.contains(old));
        previous
    }

    pub fn to_ref(&self) -> MaterialRef {
        MaterialRef {
            id: self.id,
            name: self.name.clone(),
            description: self.description.clone(),
            key: self.key,
        }
    }

    fn refresh_members(&mut self) -> &mut Self {
        let owner = self.to_ref();
        for method in &mut self.methods {
            method.material = Some(owner.clone());
        }
        self
    }

    pub(crate) fn from_parts(
        model: Model,
        methods: Vec<material_methods::Model>,
    ) -> ResultEngine<Self> {
        let mut material = Self::with_id(model.id, model.name, model.description);
        for method in methods {
            material.add_method(MaterialMethod::from_parts(method, None)?);
        }
        Ok(material)
    }
}

/// Identity is the persisted id. Two unsaved materials are only equal to
/// themselves.
impl PartialEq for Material {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

/// Snapshot of the owning material held by a method.
#[derive(Clone, Debug)]
pub struct MaterialRef {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Key of the in-memory owner, 0 when read from the store.
    key: u64,
}

impl MaterialRef {
    pub(crate) fn refers_to(&self, material: &Material) -> bool {
        match (self.id, material.id) {
            (Some(a), Some(b)) => a == b,
            _ => self.key != 0 && self.key == material.key,
        }
    }
}

/// Compares the snapshot values, not the owner identity.
impl PartialEq for MaterialRef {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.name == other.name && self.description == other.description
    }
}

impl Eq for MaterialRef {}

impl From<&Model> for MaterialRef {
    fn from(value: &Model) -> Self {
        Self {
            id: Some(value.id),
            name: value.name.clone(),
            description: value.description.clone(),
            key: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "material")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::material_methods::Entity")]
    Methods,
}

impl Related<super::material_methods::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Methods.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Resolve an API sort property to a column.
pub(crate) fn sort_column(property: &str) -> Option<Column> {
    match property {
        "id" => Some(Column::Id),
        "name" => Some(Column::Name),
        "description" => Some(Column::Description),
        _ => None,
    }
}
