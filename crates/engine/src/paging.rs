//! Offset pagination over any entity.

use std::str::FromStr;

use sea_orm::{ConnectionTrait, EntityTrait, PaginatorTrait, QueryOrder, Select};

use crate::{EngineError, ResultEngine};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 2000;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
    #[default]
    Asc,
    Desc,
}

/// One `property[,asc|desc]` sort criterion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SortOrder {
    pub property: String,
    pub direction: Direction,
}

impl SortOrder {
    pub fn asc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Asc,
        }
    }

    pub fn desc(property: &str) -> Self {
        Self {
            property: property.to_string(),
            direction: Direction::Desc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = EngineError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split(',').map(str::trim);
        let property = parts
            .next()
            .filter(|p| !p.is_empty())
            .ok_or_else(|| EngineError::Invalid("empty sort property".to_string()))?;
        let direction = match parts.next().map(str::to_ascii_lowercase).as_deref() {
            None | Some("") | Some("asc") => Direction::Asc,
            Some("desc") => Direction::Desc,
            Some(other) => {
                return Err(EngineError::Invalid(format!(
                    "invalid sort direction: {other}"
                )));
            }
        };
        if parts.next().is_some() {
            return Err(EngineError::Invalid(format!("invalid sort: {value}")));
        }

        Ok(Self {
            property: property.to_string(),
            direction,
        })
    }
}

/// Requested slice of an ordered result set. Pages are 0-based.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
    pub sort: Vec<SortOrder>,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: Vec::new(),
        }
    }
}

impl PageRequest {
    /// Builds a request, clamping `size` to `1..=MAX_PAGE_SIZE`.
    pub fn new(page: u64, size: u64) -> Self {
        Self {
            page,
            size: size.clamp(1, MAX_PAGE_SIZE),
            sort: Vec::new(),
        }
    }

    pub fn sorted_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Row offset of the first element, `None` when it does not fit a SQL
    /// `OFFSET` (a signed 64-bit integer).
    pub fn offset(&self) -> Option<u64> {
        self.page
            .checked_mul(self.size)
            .filter(|offset| i64::try_from(*offset).is_ok())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub number: u64,
    pub size: u64,
    pub total_elements: u64,
}

impl<T> Page<T> {
    pub fn total_pages(&self) -> u64 {
        if self.size == 0 {
            return 0;
        }
        self.total_elements.div_ceil(self.size)
    }

    pub fn has_next(&self) -> bool {
        self.number.saturating_add(1) < self.total_pages()
    }

    pub fn has_previous(&self) -> bool {
        self.number > 0
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

/// Fetch one page of `select`, ordered by the requested sort and then by `id`.
///
/// `column` resolves a sort property to a column, unknown properties are
/// rejected.
pub(crate) async fn fetch_page<E, C>(
    conn: &C,
    mut select: Select<E>,
    request: &PageRequest,
    column: impl Fn(&str) -> Option<E::Column>,
    id: E::Column,
) -> ResultEngine<(Vec<E::Model>, u64)>
where
    E: EntityTrait,
    E::Model: Sync + 'static,
    C: ConnectionTrait,
{
    for order in &request.sort {
        let col = column(order.property.as_str()).ok_or_else(|| {
            EngineError::Invalid(format!("unknown sort property: {}", order.property))
        })?;
        select = match order.direction {
            Direction::Asc => select.order_by_asc(col),
            Direction::Desc => select.order_by_desc(col),
        };
    }
    if !request.sort.iter().any(|order| order.property == "id") {
        select = select.order_by_asc(id);
    }

    if request.offset().is_none() {
        return Err(EngineError::Invalid(format!(
            "page out of range: {}",
            request.page
        )));
    }

    let paginator = select.paginate(conn, request.size.max(1));
    let total = paginator.num_items().await?;
    let rows = paginator.fetch_page(request.page).await?;
    Ok((rows, total))
}
