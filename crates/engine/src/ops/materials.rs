use sea_orm::{
    ActiveValue, DatabaseTransaction, LoaderTrait, QueryFilter, QueryOrder, prelude::*,
};

use crate::{
    Engine, EngineError, Material, Page, PageRequest, ResultEngine, material_methods, materials,
    paging,
};

use super::{relations, with_read_tx, with_tx};

/// Field values for writing a material.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MaterialData {
    pub name: Option<String>,
    pub description: Option<String>,
    /// `None` leaves the method set untouched, `Some` replaces it.
    pub method_ids: Option<Vec<i64>>,
}

impl Engine {
    /// Persist a new material. The store assigns the id.
    pub async fn save_material(&self, data: MaterialData) -> ResultEngine<Material> {
        tracing::debug!(?data, "Request to save Material");
        let (material, touched) = with_tx!(self, |db_tx| {
            let model = materials::ActiveModel {
                id: ActiveValue::NotSet,
                name: ActiveValue::Set(data.name),
                description: ActiveValue::Set(data.description),
            }
            .insert(&db_tx)
            .await?;

            let touched = match data.method_ids.as_deref() {
                Some(ids) => relations::replace_methods(&db_tx, model.id, ids).await?,
                None => Vec::new(),
            };
            Ok((load_graph(&db_tx, model).await?, touched))
        })?;

        self.methods.invalidate_all(touched);
        Ok(material)
    }

    /// Overwrite every field of material `id`.
    pub async fn update_material(&self, id: i64, data: MaterialData) -> ResultEngine<Material> {
        tracing::debug!(id, ?data, "Request to update Material");
        let (material, touched) = with_tx!(self, |db_tx| {
            let model = materials::ActiveModel {
                id: ActiveValue::Unchanged(id),
                name: ActiveValue::Set(data.name),
                description: ActiveValue::Set(data.description),
            }
            .update(&db_tx)
            .await
            .map_err(|err| EngineError::from_update(err, || format!("material {id}")))?;

            let touched = match data.method_ids.as_deref() {
                Some(ids) => relations::replace_methods(&db_tx, id, ids).await?,
                None => Vec::new(),
            };
            Ok((load_graph(&db_tx, model).await?, touched))
        })?;

        self.materials.invalidate(id);
        self.methods.invalidate_all(touched);
        Ok(material)
    }

    /// Overwrite only the fields given in `data`.
    ///
    /// Returns `None` when material `id` does not exist.
    pub async fn partial_update_material(
        &self,
        id: i64,
        data: MaterialData,
    ) -> ResultEngine<Option<Material>> {
        tracing::debug!(id, ?data, "Request to partially update Material");
        let updated = with_tx!(self, |db_tx| {
            match materials::Entity::find_by_id(id).one(&db_tx).await? {
                None => Ok(None),
                Some(existing) => {
                    let mut active: materials::ActiveModel = existing.clone().into();
                    if let Some(name) = data.name {
                        active.name = ActiveValue::Set(Some(name));
                    }
                    if let Some(description) = data.description {
                        active.description = ActiveValue::Set(Some(description));
                    }
                    let model = if active.is_changed() {
                        active.update(&db_tx).await?
                    } else {
                        existing
                    };

                    let touched = match data.method_ids.as_deref() {
                        Some(ids) => relations::replace_methods(&db_tx, id, ids).await?,
                        None => Vec::new(),
                    };
                    Ok(Some((load_graph(&db_tx, model).await?, touched)))
                }
            }
        })?;

        Ok(updated.map(|(material, touched)| {
            self.materials.invalidate(id);
            self.methods.invalidate_all(touched);
            material
        }))
    }

    /// Return one page of materials with their methods.
    pub async fn find_all_materials(&self, request: &PageRequest) -> ResultEngine<Page<Material>> {
        tracing::debug!(?request, "Request to get all Materials");
        with_read_tx!(self, |db_tx| {
            let (rows, total) = paging::fetch_page(
                &db_tx,
                materials::Entity::find(),
                request,
                materials::sort_column,
                materials::Column::Id,
            )
            .await?;
            let methods = rows.load_many(material_methods::Entity, &db_tx).await?;

            let content = rows
                .into_iter()
                .zip(methods)
                .map(|(row, mut methods)| {
                    methods.sort_by_key(|m| m.id);
                    Material::from_parts(row, methods)
                })
                .collect::<ResultEngine<Vec<_>>>()?;
            Ok(Page {
                content,
                number: request.page,
                size: request.size,
                total_elements: total,
            })
        })
    }

    /// Return material `id` with its methods, if it exists.
    pub async fn find_material(&self, id: i64) -> ResultEngine<Option<Material>> {
        tracing::debug!(id, "Request to get Material");
        let (cached, stamp) = self.materials.lookup(id);
        with_read_tx!(self, |db_tx| {
            let row = match cached {
                Some(row) => Some(row),
                None => {
                    let row = materials::Entity::find_by_id(id).one(&db_tx).await?;
                    if let Some(row) = &row {
                        self.materials.put(id, row.clone(), stamp);
                    }
                    row
                }
            };
            match row {
                None => Ok(None),
                Some(row) => Ok(Some(load_graph(&db_tx, row).await?)),
            }
        })
    }

    pub async fn material_exists(&self, id: i64) -> ResultEngine<bool> {
        if self.materials.get(id).is_some() {
            return Ok(true);
        }
        let row = materials::Entity::find_by_id(id)
            .one(&self.database)
            .await?;
        Ok(row.is_some())
    }

    /// Delete material `id`. Its methods are kept and lose their
    /// back-reference. Deleting a missing id is not an error.
    pub async fn delete_material(&self, id: i64) -> ResultEngine<()> {
        tracing::debug!(id, "Request to delete Material");
        let touched = with_tx!(self, |db_tx| {
            let touched = relations::detach_all(&db_tx, id).await?;
            materials::Entity::delete_by_id(id).exec(&db_tx).await?;
            Ok(touched)
        })?;

        self.materials.invalidate(id);
        self.methods.invalidate_all(touched);
        Ok(())
    }
}

async fn load_graph(db_tx: &DatabaseTransaction, row: materials::Model) -> ResultEngine<Material> {
    let methods = material_methods::Entity::find()
        .filter(material_methods::Column::MaterialId.eq(row.id))
        .order_by_asc(material_methods::Column::Id)
        .all(db_tx)
        .await?;
    Material::from_parts(row, methods)
}
