use sea_orm::{ActiveValue, DatabaseTransaction, LoaderTrait, prelude::*};

use crate::{
    Engine, EngineError, MaterialMethod, MethodType, Page, PageRequest, ResultEngine,
    material_methods, materials, paging,
};

use super::{relations, with_read_tx, with_tx};

/// Field values for writing a material method.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MethodData {
    /// Required on save and full update.
    pub method_type: Option<MethodType>,
    /// Owning material.
    pub material_id: Option<i64>,
}

impl MethodData {
    fn required_type(&self) -> ResultEngine<MethodType> {
        self.method_type
            .ok_or_else(|| EngineError::Invalid("type is required".to_string()))
    }
}

impl Engine {
    /// Persist a new material method. The store assigns the id.
    pub async fn save_method(&self, data: MethodData) -> ResultEngine<MaterialMethod> {
        tracing::debug!(?data, "Request to save MaterialMethod");
        let kind = data.required_type()?;
        with_tx!(self, |db_tx| {
            let owner = match data.material_id {
                Some(material_id) => Some(relations::require_owner(&db_tx, material_id).await?),
                None => None,
            };
            let model = material_methods::ActiveModel {
                id: ActiveValue::NotSet,
                kind: ActiveValue::Set(kind.as_str().to_string()),
                material_id: ActiveValue::Set(data.material_id),
            }
            .insert(&db_tx)
            .await?;
            MaterialMethod::from_parts(model, owner.as_ref())
        })
    }

    /// Overwrite every field of method `id`, including its owner.
    pub async fn update_method(&self, id: i64, data: MethodData) -> ResultEngine<MaterialMethod> {
        tracing::debug!(id, ?data, "Request to update MaterialMethod");
        let kind = data.required_type()?;
        let method = with_tx!(self, |db_tx| {
            let owner = match data.material_id {
                Some(material_id) => Some(relations::require_owner(&db_tx, material_id).await?),
                None => None,
            };
            let model = material_methods::ActiveModel {
                id: ActiveValue::Unchanged(id),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                material_id: ActiveValue::Set(data.material_id),
            }
            .update(&db_tx)
            .await
            .map_err(|err| EngineError::from_update(err, || format!("material method {id}")))?;
            MaterialMethod::from_parts(model, owner.as_ref())
        })?;

        self.methods.invalidate(id);
        Ok(method)
    }

    /// Overwrite only the fields given in `data`.
    ///
    /// Returns `None` when method `id` does not exist.
    pub async fn partial_update_method(
        &self,
        id: i64,
        data: MethodData,
    ) -> ResultEngine<Option<MaterialMethod>> {
        tracing::debug!(id, ?data, "Request to partially update MaterialMethod");
        let updated = with_tx!(self, |db_tx| {
            match material_methods::Entity::find_by_id(id).one(&db_tx).await? {
                None => Ok(None),
                Some(existing) => {
                    let mut active: material_methods::ActiveModel = existing.clone().into();
                    if let Some(kind) = data.method_type {
                        active.kind = ActiveValue::Set(kind.as_str().to_string());
                    }
                    if let Some(material_id) = data.material_id {
                        relations::require_owner(&db_tx, material_id).await?;
                        active.material_id = ActiveValue::Set(Some(material_id));
                    }
                    let model = if active.is_changed() {
                        active.update(&db_tx).await?
                    } else {
                        existing
                    };
                    let owner = load_owner(&db_tx, model.material_id).await?;
                    Ok(Some(MaterialMethod::from_parts(model, owner.as_ref())?))
                }
            }
        })?;

        if updated.is_some() {
            self.methods.invalidate(id);
        }
        Ok(updated)
    }

    /// Return one page of material methods with their owners.
    pub async fn find_all_methods(
        &self,
        request: &PageRequest,
    ) -> ResultEngine<Page<MaterialMethod>> {
        tracing::debug!(?request, "Request to get all MaterialMethods");
        with_read_tx!(self, |db_tx| {
            let (rows, total) = paging::fetch_page(
                &db_tx,
                material_methods::Entity::find(),
                request,
                material_methods::sort_column,
                material_methods::Column::Id,
            )
            .await?;
            let owners = rows.load_one(materials::Entity, &db_tx).await?;

            let content = rows
                .into_iter()
                .zip(owners)
                .map(|(row, owner)| MaterialMethod::from_parts(row, owner.as_ref()))
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(Page {
                content,
                number: request.page,
                size: request.size,
                total_elements: total,
            })
        })
    }

    /// Return method `id` with its owner, if it exists.
    pub async fn find_method(&self, id: i64) -> ResultEngine<Option<MaterialMethod>> {
        tracing::debug!(id, "Request to get MaterialMethod");
        let (cached, stamp) = self.methods.lookup(id);
        with_read_tx!(self, |db_tx| {
            let row = match cached {
                Some(row) => Some(row),
                None => {
                    let row = material_methods::Entity::find_by_id(id).one(&db_tx).await?;
                    if let Some(row) = &row {
                        self.methods.put(id, row.clone(), stamp);
                    }
                    row
                }
            };
            match row {
                None => Ok(None),
                Some(row) => {
                    // Owners are served from the cache but only filled by `find_material`.
                    let owner = match row.material_id.and_then(|owner| self.materials.get(owner)) {
                        Some(owner) => Some(owner),
                        None => load_owner(&db_tx, row.material_id).await?,
                    };
                    Ok(Some(MaterialMethod::from_parts(row, owner.as_ref())?))
                }
            }
        })
    }

    pub async fn method_exists(&self, id: i64) -> ResultEngine<bool> {
        if self.methods.get(id).is_some() {
            return Ok(true);
        }
        let row = material_methods::Entity::find_by_id(id)
            .one(&self.database)
            .await?;
        Ok(row.is_some())
    }

    /// Delete method `id`. Deleting a missing id is not an error.
    pub async fn delete_method(&self, id: i64) -> ResultEngine<()> {
        tracing::debug!(id, "Request to delete MaterialMethod");
        with_tx!(self, |db_tx| {
            material_methods::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })?;

        self.methods.invalidate(id);
        Ok(())
    }
}

async fn load_owner(
    db_tx: &DatabaseTransaction,
    material_id: Option<i64>,
) -> ResultEngine<Option<materials::Model>> {
    match material_id {
        Some(material_id) => Ok(materials::Entity::find_by_id(material_id)
            .one(db_tx)
            .await?),
        None => Ok(None),
    }
}
