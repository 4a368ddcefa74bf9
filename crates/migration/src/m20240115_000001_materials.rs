//! Initial schema.
//!
//! - `material`: id, name, description
//! - `material_method`: id, type, material_id (nullable FK to `material`)

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Material {
    Table,
    Id,
    Name,
    Description,
}

#[derive(Iden)]
enum MaterialMethod {
    Table,
    Id,
    Type,
    MaterialId,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Material::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Material::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Material::Name).string())
                    .col(ColumnDef::new(Material::Description).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MaterialMethod::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MaterialMethod::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MaterialMethod::Type).string().not_null())
                    .col(ColumnDef::new(MaterialMethod::MaterialId).integer())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-material_method-material_id")
                            .from(MaterialMethod::Table, MaterialMethod::MaterialId)
                            .to(Material::Table, Material::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-material_method-material_id")
                    .table(MaterialMethod::Table)
                    .col(MaterialMethod::MaterialId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MaterialMethod::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Material::Table).to_owned())
            .await
    }
}
