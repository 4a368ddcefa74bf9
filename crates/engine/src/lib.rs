use sea_orm::DatabaseConnection;

pub use cache::{EntityCache, Stamp};
pub use error::EngineError;
pub use material_methods::{MaterialMethod, MethodType};
pub use materials::{Material, MaterialRef};
pub use ops::{MaterialData, MethodData};
pub use paging::{DEFAULT_PAGE_SIZE, Direction, MAX_PAGE_SIZE, Page, PageRequest, SortOrder};

mod cache;
mod error;
mod material_methods;
mod materials;
mod ops;
mod paging;

type ResultEngine<T> = Result<T, EngineError>;

/// Service layer over materials and their methods.
///
/// Every write runs inside its own database transaction and every read inside
/// a read-only one. Rows are cached by id in front of the store.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    materials: EntityCache<materials::Model>,
    methods: EntityCache<material_methods::Model>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Drop every cached row.
    pub fn evict_all(&self) {
        self.materials.clear();
        self.methods.clear();
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
            materials: EntityCache::new(),
            methods: EntityCache::new(),
        })
    }
}
