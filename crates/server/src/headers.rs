//! Alert headers attached to entity responses.
//!
//! Successful writes carry `X-<app>-alert` with a human readable message and
//! `X-<app>-params` with the entity id. Rejections carry `X-<app>-error`
//! with the error key and `X-<app>-params` with the entity name.

use axum::http::{HeaderMap, HeaderName, HeaderValue, header::LOCATION};

pub fn created(app_name: &str, entity_name: &str, id: i64) -> HeaderMap {
    alert(
        app_name,
        &format!("A new {entity_name} is created with identifier {id}"),
        &id.to_string(),
    )
}

pub fn updated(app_name: &str, entity_name: &str, id: i64) -> HeaderMap {
    alert(
        app_name,
        &format!("A {entity_name} is updated with identifier {id}"),
        &id.to_string(),
    )
}

pub fn deleted(app_name: &str, entity_name: &str, id: i64) -> HeaderMap {
    alert(
        app_name,
        &format!("A {entity_name} is deleted with identifier {id}"),
        &id.to_string(),
    )
}

pub fn error_alert(app_name: &str, entity_name: &str, error_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(
        &mut headers,
        &format!("x-{app_name}-error"),
        &format!("error.{error_key}"),
    );
    insert(&mut headers, &format!("x-{app_name}-params"), entity_name);
    headers
}

/// Point `Location` at a newly created resource.
pub fn location(headers: &mut HeaderMap, path: &str) {
    match HeaderValue::from_str(path) {
        Ok(value) => {
            headers.insert(LOCATION, value);
        }
        Err(_) => tracing::error!("failed to encode location {path}"),
    }
}

fn alert(app_name: &str, message: &str, param: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    insert(&mut headers, &format!("x-{app_name}-alert"), message);
    insert(&mut headers, &format!("x-{app_name}-params"), param);
    headers
}

fn insert(headers: &mut HeaderMap, name: &str, value: &str) {
    let name = match HeaderName::try_from(name.to_ascii_lowercase()) {
        Ok(name) => name,
        Err(_) => {
            tracing::error!("invalid alert header name: {name}");
            return;
        }
    };
    match HeaderValue::from_str(value) {
        Ok(value) => {
            headers.insert(name, value);
        }
        Err(_) => tracing::error!("failed to encode alert header {name}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creation_alert_names_entity_and_id() {
        let headers = created("matchless", "materialMethod", 7);
        assert_eq!(
            headers["x-matchless-alert"],
            "A new materialMethod is created with identifier 7"
        );
        assert_eq!(headers["x-matchless-params"], "7");
    }

    #[test]
    fn location_is_added_next_to_the_alert() {
        let mut headers = created("matchless", "material", 3);
        location(&mut headers, "/api/materials/3");
        assert_eq!(headers["location"], "/api/materials/3");
        assert_eq!(headers["x-matchless-params"], "3");

        let mut headers = HeaderMap::new();
        location(&mut headers, "/api/materials/\n");
        assert!(headers.is_empty());
    }

    #[test]
    fn invalid_app_name_yields_no_headers() {
        let headers = deleted("bad app", "material", 1);
        assert!(headers.is_empty());
    }
}
