mod material_methods;
mod materials;
mod relations;

pub use material_methods::MethodData;
pub use materials::MaterialData;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = sea_orm::TransactionTrait::begin(&$self.database).await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

/// Like `with_tx!`, but the transaction is opened read-only where the backend
/// supports it (SQLite does not).
macro_rules! with_read_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let access_mode = match sea_orm::ConnectionTrait::get_database_backend(&$self.database) {
            sea_orm::DbBackend::Sqlite => None,
            _ => Some(sea_orm::AccessMode::ReadOnly),
        };
        let $tx =
            sea_orm::TransactionTrait::begin_with_config(&$self.database, None, access_mode)
                .await?;
        let result: $crate::ResultEngine<_> = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_read_tx;
pub(crate) use with_tx;
