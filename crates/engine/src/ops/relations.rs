//! Material ↔ method association in the store.
//!
//! The back-reference is `material_method.material_id`, the method set of a
//! material is whatever rows point at it. Helpers return the ids of the
//! method rows they touched so callers can invalidate them after commit.

use sea_orm::{ActiveValue, DatabaseTransaction, QueryFilter, prelude::*, sea_query::Expr};

use crate::{EngineError, ResultEngine, material_methods, materials};

use super::with_tx;
use crate::Engine;

impl Engine {
    /// Put `method_id` into the method set of `material_id`, moving it away
    /// from its previous owner if any.
    pub async fn add_method(&self, material_id: i64, method_id: i64) -> ResultEngine<()> {
        tracing::debug!(material_id, method_id, "Request to add method to Material");
        with_tx!(self, |db_tx| {
            require_material(&db_tx, material_id).await?;
            let method = material_methods::Entity::find_by_id(method_id)
                .one(&db_tx)
                .await?
                .ok_or_else(|| EngineError::NotFound(format!("material method {method_id}")))?;

            let mut active: material_methods::ActiveModel = method.into();
            active.material_id = ActiveValue::Set(Some(material_id));
            active.update(&db_tx).await?;
            Ok(())
        })?;

        self.methods.invalidate(method_id);
        Ok(())
    }

    /// Take `method_id` out of the method set of `material_id`.
    ///
    /// Nothing happens when the method is not a member. Returns whether it
    /// was.
    pub async fn remove_method(&self, material_id: i64, method_id: i64) -> ResultEngine<bool> {
        tracing::debug!(material_id, method_id, "Request to remove method from Material");
        let removed = with_tx!(self, |db_tx| {
            let res = material_methods::Entity::update_many()
                .col_expr(
                    material_methods::Column::MaterialId,
                    Expr::value(Option::<i64>::None),
                )
                .filter(material_methods::Column::Id.eq(method_id))
                .filter(material_methods::Column::MaterialId.eq(material_id))
                .exec(&db_tx)
                .await?;
            Ok(res.rows_affected > 0)
        })?;

        if removed {
            self.methods.invalidate(method_id);
        }
        Ok(removed)
    }

    /// Replace the method set of `material_id` with `method_ids`.
    pub async fn set_methods(&self, material_id: i64, method_ids: &[i64]) -> ResultEngine<()> {
        tracing::debug!(material_id, ?method_ids, "Request to set methods of Material");
        let touched = with_tx!(self, |db_tx| {
            require_material(&db_tx, material_id).await?;
            replace_methods(&db_tx, material_id, method_ids).await
        })?;

        self.methods.invalidate_all(touched);
        Ok(())
    }
}

async fn require_material(db_tx: &DatabaseTransaction, material_id: i64) -> ResultEngine<()> {
    materials::Entity::find_by_id(material_id)
        .one(db_tx)
        .await?
        .map(|_| ())
        .ok_or_else(|| EngineError::NotFound(format!("material {material_id}")))
}

/// Load the material a method is about to point at.
pub(super) async fn require_owner(
    db_tx: &DatabaseTransaction,
    material_id: i64,
) -> ResultEngine<materials::Model> {
    materials::Entity::find_by_id(material_id)
        .one(db_tx)
        .await?
        .ok_or_else(|| EngineError::UnknownRelation(format!("material {material_id}")))
}

/// Clear the back-reference of every current member of `material_id`.
pub(super) async fn detach_all(
    db_tx: &DatabaseTransaction,
    material_id: i64,
) -> ResultEngine<Vec<i64>> {
    let members: Vec<i64> = material_methods::Entity::find()
        .filter(material_methods::Column::MaterialId.eq(material_id))
        .all(db_tx)
        .await?
        .into_iter()
        .map(|m| m.id)
        .collect();
    if members.is_empty() {
        return Ok(members);
    }

    material_methods::Entity::update_many()
        .col_expr(
            material_methods::Column::MaterialId,
            Expr::value(Option::<i64>::None),
        )
        .filter(material_methods::Column::MaterialId.eq(material_id))
        .exec(db_tx)
        .await?;
    Ok(members)
}

/// Detach every current member, then adopt `method_ids`.
///
/// Unknown ids are rejected before anything is written.
pub(super) async fn replace_methods(
    db_tx: &DatabaseTransaction,
    material_id: i64,
    method_ids: &[i64],
) -> ResultEngine<Vec<i64>> {
    let mut wanted = method_ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    if !wanted.is_empty() {
        let found: Vec<i64> = material_methods::Entity::find()
            .filter(material_methods::Column::Id.is_in(wanted.iter().copied()))
            .all(db_tx)
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect();
        let missing: Vec<i64> = wanted
            .iter()
            .copied()
            .filter(|id| !found.contains(id))
            .collect();
        if !missing.is_empty() {
            return Err(EngineError::UnknownRelation(format!(
                "material methods {missing:?}"
            )));
        }
    }

    let mut touched = detach_all(db_tx, material_id).await?;
    if !wanted.is_empty() {
        material_methods::Entity::update_many()
            .col_expr(
                material_methods::Column::MaterialId,
                Expr::value(Some(material_id)),
            )
            .filter(material_methods::Column::Id.is_in(wanted.iter().copied()))
            .exec(db_tx)
            .await?;
    }

    touched.extend(wanted);
    touched.sort_unstable();
    touched.dedup();
    Ok(touched)
}
