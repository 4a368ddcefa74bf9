//! `page`/`size`/`sort` query parameters and the pagination response headers.

use axum::http::{HeaderMap, HeaderValue, Uri};
use engine::{DEFAULT_PAGE_SIZE, Page, PageRequest, SortOrder};

use crate::{ServerError, server::ServerState};

/// Parse the query pairs of a list request. `sort` may repeat and must name
/// one of `sortable`.
pub fn page_request(
    state: &ServerState,
    entity_name: &'static str,
    sortable: &[&str],
    pairs: &[(String, String)],
) -> Result<PageRequest, ServerError> {
    let mut page = 0;
    let mut size = DEFAULT_PAGE_SIZE;
    let mut sort = Vec::new();

    for (key, value) in pairs {
        match key.as_str() {
            "page" => {
                page = value
                    .parse()
                    .map_err(|_| ServerError::Generic(format!("invalid page: {value}")))?;
            }
            "size" => {
                size = value
                    .parse()
                    .map_err(|_| ServerError::Generic(format!("invalid size: {value}")))?;
            }
            "sort" => {
                let order = value
                    .parse::<SortOrder>()
                    .ok()
                    .filter(|order| sortable.contains(&order.property.as_str()))
                    .ok_or_else(|| {
                        state.bad_request(
                            &format!("Invalid sort: {value}"),
                            entity_name,
                            "sortinvalid",
                        )
                    })?;
                sort.push(order);
            }
            _ => {}
        }
    }

    let mut request = PageRequest::new(page, size);
    if request.offset().is_none() {
        return Err(ServerError::Generic(format!("page out of range: {page}")));
    }
    request.sort = sort;
    Ok(request)
}

/// `X-Total-Count` plus a `Link` header with `next`, `prev`, `last` and
/// `first` relations, built from the request uri.
pub fn headers<T>(uri: &Uri, page: &Page<T>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert("x-total-count", HeaderValue::from(page.total_elements));

    let last = page.total_pages().saturating_sub(1);
    let mut links = Vec::with_capacity(4);
    if page.has_next() {
        links.push(link(uri, page.number + 1, page.size, "next"));
    }
    if page.has_previous() {
        links.push(link(uri, page.number - 1, page.size, "prev"));
    }
    links.push(link(uri, last, page.size, "last"));
    links.push(link(uri, 0, page.size, "first"));

    match HeaderValue::from_str(&links.join(",")) {
        Ok(value) => {
            headers.insert("link", value);
        }
        Err(_) => tracing::error!("failed to encode link header"),
    }
    headers
}

fn link(uri: &Uri, page: u64, size: u64, rel: &str) -> String {
    let mut query: Vec<&str> = uri
        .query()
        .unwrap_or_default()
        .split('&')
        .filter(|part| !part.is_empty())
        .filter(|part| !part.starts_with("page=") && !part.starts_with("size="))
        .collect();
    let paging = format!("page={page}&size={size}");
    query.push(&paging);

    format!("<{}?{}>; rel=\"{rel}\"", uri.path(), query.join("&"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Alert;

    const SORTABLE: &[&str] = &["id", "name"];

    async fn state() -> ServerState {
        let engine = engine::Engine::builder().build().await.unwrap();
        ServerState::new(engine, "matchless")
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn defaults_to_first_page_of_twenty() {
        let state = state().await;
        let request = page_request(&state, "material", SORTABLE, &[]).unwrap();
        assert_eq!(request, PageRequest::default());
    }

    #[tokio::test]
    async fn repeated_sort_is_kept_in_order() {
        let state = state().await;
        let request = page_request(&state, "material", SORTABLE, &pairs(&[
            ("page", "2"),
            ("size", "5"),
            ("sort", "name,desc"),
            ("sort", "id"),
        ]))
        .unwrap();
        assert_eq!(request.page, 2);
        assert_eq!(request.size, 5);
        assert_eq!(request.sort, vec![SortOrder::desc("name"), SortOrder::asc("id")]);
    }

    #[tokio::test]
    async fn non_numeric_page_is_rejected() {
        let state = state().await;
        let request = page_request(&state, "material", SORTABLE, &pairs(&[("page", "first")]));
        assert!(request.is_err());
    }

    #[tokio::test]
    async fn page_beyond_addressable_offset_is_rejected() {
        let state = state().await;
        let huge = u64::MAX.to_string();
        let request = page_request(&state, "material", SORTABLE, &pairs(&[("page", huge.as_str())]));
        assert!(matches!(request, Err(ServerError::Generic(_))));

        let last = (i64::MAX as u64).to_string();
        let request =
            page_request(&state, "material", SORTABLE, &pairs(&[("page", last.as_str()), ("size", "1")]));
        assert_eq!(request.unwrap().page, i64::MAX as u64);
    }

    #[tokio::test]
    async fn unknown_sort_property_is_an_alert() {
        let state = state().await;
        let err = page_request(&state, "material", SORTABLE, &pairs(&[("sort", "colour,asc")]));
        assert!(matches!(
            err,
            Err(ServerError::BadRequest(Alert { error_key: "sortinvalid", .. }))
        ));
    }

    #[test]
    fn link_header_lists_neighbours_and_bounds() {
        let uri: Uri = "/api/materials?page=1&size=2&sort=name,asc".parse().unwrap();
        let page = Page {
            content: vec![(), ()],
            number: 1,
            size: 2,
            total_elements: 5,
        };

        let headers = headers(&uri, &page);
        assert_eq!(headers["x-total-count"], "5");
        assert_eq!(
            headers["link"],
            "</api/materials?sort=name,asc&page=2&size=2>; rel=\"next\",\
             </api/materials?sort=name,asc&page=0&size=2>; rel=\"prev\",\
             </api/materials?sort=name,asc&page=2&size=2>; rel=\"last\",\
             </api/materials?sort=name,asc&page=0&size=2>; rel=\"first\""
        );
    }

    #[test]
    fn empty_result_links_only_to_first_page() {
        let uri: Uri = "/api/material-methods".parse().unwrap();
        let page: Page<()> = Page {
            content: Vec::new(),
            number: 0,
            size: 20,
            total_elements: 0,
        };

        let headers = headers(&uri, &page);
        assert_eq!(headers["x-total-count"], "0");
        assert_eq!(
            headers["link"],
            "</api/material-methods?page=0&size=20>; rel=\"last\",\
             </api/material-methods?page=0&size=20>; rel=\"first\""
        );
    }
}
