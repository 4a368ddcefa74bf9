//! The module contains `MaterialMethod` and its table.

use sea_orm::entity::prelude::*;

use crate::{EngineError, ResultEngine, materials};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodType {
    Buy,
    Make,
}

impl MethodType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buy => "BUY",
            Self::Make => "MAKE",
        }
    }
}

impl TryFrom<&str> for MethodType {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "BUY" => Ok(Self::Buy),
            "MAKE" => Ok(Self::Make),
            other => Err(EngineError::Invalid(format!("invalid method type: {other}"))),
        }
    }
}

/// A way of obtaining a material.
///
/// `material` is the back-reference to the owning material. It is kept in
/// lockstep with [`Material::methods`](crate::Material::methods) by the
/// relationship operations on `Material`, never set by hand.
#[derive(Clone, Debug)]
pub struct MaterialMethod {
    /// Assigned by the store on first persist.
    pub id: Option<i64>,
    pub method_type: MethodType,
    pub(crate) material: Option<materials::MaterialRef>,
}

impl MaterialMethod {
    pub const SORTABLE: &'static [&'static str] = &["id", "type"];

    pub fn new(method_type: MethodType) -> Self {
        Self {
            id: None,
            method_type,
            material: None,
        }
    }

    pub fn with_id(id: i64, method_type: MethodType) -> Self {
        Self {
            id: Some(id),
            method_type,
            material: None,
        }
    }

    /// The owning material, if any.
    pub fn material(&self) -> Option<&materials::MaterialRef> {
        self.material.as_ref()
    }

    /// Whether this method's back-reference points at `material`.
    pub fn belongs_to(&self, material: &materials::Material) -> bool {
        self.material
            .as_ref()
            .is_some_and(|owner| owner.refers_to(material))
    }

    pub(crate) fn from_parts(
        model: Model,
        material: Option<&materials::Model>,
    ) -> ResultEngine<Self> {
        Ok(Self {
            id: Some(model.id),
            method_type: MethodType::try_from(model.kind.as_str())?,
            material: material.map(materials::MaterialRef::from),
        })
    }
}

/// Identity is the persisted id. Two unsaved methods are only equal to
/// themselves.
impl PartialEq for MaterialMethod {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || matches!((self.id, other.id), (Some(a), Some(b)) if a == b)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "material_method")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(column_name = "type")]
    pub kind: String,
    pub material_id: Option<i64>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::materials::Entity",
        from = "Column::MaterialId",
        to = "super::materials::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Material,
}

impl Related<super::materials::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Material.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Resolve an API sort property to a column.
pub(crate) fn sort_column(property: &str) -> Option<Column> {
    match property {
        "id" => Some(Column::Id),
        "type" => Some(Column::Kind),
        _ => None,
    }
}
