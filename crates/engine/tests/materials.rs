use sea_orm::{Database, DatabaseConnection};

use engine::{Engine, EngineError, MaterialData, MethodData, MethodType, PageRequest, SortOrder};
use migration::MigratorTrait;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    (engine, db)
}

fn material(name: &str) -> MaterialData {
    MaterialData {
        name: Some(name.to_string()),
        description: Some(format!("{name} description")),
        method_ids: None,
    }
}

fn method(kind: MethodType) -> MethodData {
    MethodData {
        method_type: Some(kind),
        material_id: None,
    }
}

#[tokio::test]
async fn save_assigns_ids_and_find_returns_same_fields() {
    let (engine, _db) = engine_with_db().await;

    let saved = engine.save_material(material("thermostat")).await.unwrap();
    let id = saved.id().unwrap();

    let found = engine.find_material(id).await.unwrap().unwrap();
    assert_eq!(found, saved);
    assert_eq!(found.name(), Some("thermostat"));
    assert_eq!(found.description(), Some("thermostat description"));
    assert!(found.methods().is_empty());

    let second = engine.save_material(material("copper")).await.unwrap();
    assert_ne!(second.id(), saved.id());
}

#[tokio::test]
async fn save_method_requires_type() {
    let (engine, _db) = engine_with_db().await;

    let err = engine.save_method(MethodData::default()).await.unwrap_err();
    assert_eq!(err, EngineError::Invalid("type is required".to_string()));

    let page = engine.find_all_methods(&PageRequest::default()).await.unwrap();
    assert_eq!(page.total_elements, 0);
}

#[tokio::test]
async fn method_with_owner_shows_up_in_material() {
    let (engine, _db) = engine_with_db().await;
    let owner = engine.save_material(material("thermostat")).await.unwrap();
    let owner_id = owner.id().unwrap();

    let method = engine
        .save_method(MethodData {
            method_type: Some(MethodType::Buy),
            material_id: Some(owner_id),
        })
        .await
        .unwrap();
    assert_eq!(method.material().and_then(|m| m.id), Some(owner_id));

    let owner = engine.find_material(owner_id).await.unwrap().unwrap();
    assert_eq!(owner.methods(), &[method.clone()]);
    assert!(owner.methods()[0].belongs_to(&owner));

    let fetched = engine.find_method(method.id.unwrap()).await.unwrap().unwrap();
    assert!(fetched.belongs_to(&owner));
    assert_eq!(
        fetched.material().and_then(|m| m.name.clone()).as_deref(),
        Some("thermostat")
    );
}

#[tokio::test]
async fn method_with_unknown_owner_is_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .save_method(MethodData {
            method_type: Some(MethodType::Make),
            material_id: Some(999),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::UnknownRelation(_)));
}

#[tokio::test]
async fn partial_update_keeps_absent_fields() {
    let (engine, _db) = engine_with_db().await;
    let saved = engine.save_material(material("thermostat")).await.unwrap();
    let id = saved.id().unwrap();

    let updated = engine
        .partial_update_material(
            id,
            MaterialData {
                description: Some("updated".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    assert_eq!(updated.name(), Some("thermostat"));
    assert_eq!(updated.description(), Some("updated"));

    let method = engine.save_method(method(MethodType::Buy)).await.unwrap();
    let method_id = method.id.unwrap();
    let unchanged = engine
        .partial_update_method(method_id, MethodData::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(unchanged.method_type, MethodType::Buy);
}

#[tokio::test]
async fn partial_update_of_missing_id_is_none() {
    let (engine, _db) = engine_with_db().await;

    let material = engine
        .partial_update_material(42, material("ghost"))
        .await
        .unwrap();
    assert!(material.is_none());

    let method = engine
        .partial_update_method(42, method(MethodType::Make))
        .await
        .unwrap();
    assert!(method.is_none());
}

#[tokio::test]
async fn full_update_overwrites_every_field() {
    let (engine, _db) = engine_with_db().await;
    let saved = engine.save_material(material("thermostat")).await.unwrap();
    let id = saved.id().unwrap();

    let updated = engine
        .update_material(
            id,
            MaterialData {
                name: Some("valve".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name(), Some("valve"));
    assert_eq!(updated.description(), None);

    let err = engine
        .update_material(999, material("ghost"))
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::NotFound("material 999".to_string()));
}

#[tokio::test]
async fn update_after_read_is_not_served_from_cache() {
    let (engine, _db) = engine_with_db().await;
    let method = engine.save_method(method(MethodType::Buy)).await.unwrap();
    let id = method.id.unwrap();

    engine.find_method(id).await.unwrap();
    engine
        .update_method(id, self::method(MethodType::Make))
        .await
        .unwrap();

    let fetched = engine.find_method(id).await.unwrap().unwrap();
    assert_eq!(fetched.method_type, MethodType::Make);
}

#[tokio::test]
async fn set_methods_replaces_store_side_membership() {
    let (engine, _db) = engine_with_db().await;
    let owner = engine.save_material(material("thermostat")).await.unwrap();
    let owner_id = owner.id().unwrap();
    let a = engine.save_method(method(MethodType::Buy)).await.unwrap().id.unwrap();
    let b = engine.save_method(method(MethodType::Make)).await.unwrap().id.unwrap();
    let c = engine.save_method(method(MethodType::Buy)).await.unwrap().id.unwrap();

    engine.set_methods(owner_id, &[a, b]).await.unwrap();
    // Warm the cache so stale back-references would show.
    engine.find_method(b).await.unwrap();

    engine.set_methods(owner_id, &[b, c]).await.unwrap();

    let owner = engine.find_material(owner_id).await.unwrap().unwrap();
    let ids: Vec<i64> = owner.methods().iter().filter_map(|m| m.id).collect();
    assert_eq!(ids, vec![b, c]);

    let dropped = engine.find_method(a).await.unwrap().unwrap();
    assert!(dropped.material().is_none());
    let kept = engine.find_method(b).await.unwrap().unwrap();
    assert!(kept.belongs_to(&owner));

    let err = engine.set_methods(owner_id, &[c, 999]).await.unwrap_err();
    assert!(matches!(err, EngineError::UnknownRelation(_)));
    let owner = engine.find_material(owner_id).await.unwrap().unwrap();
    assert_eq!(owner.methods().len(), 2);
}

#[tokio::test]
async fn add_and_remove_method_through_the_store() {
    let (engine, _db) = engine_with_db().await;
    let first = engine.save_material(material("thermostat")).await.unwrap();
    let second = engine.save_material(material("copper")).await.unwrap();
    let (first_id, second_id) = (first.id().unwrap(), second.id().unwrap());
    let method_id = engine.save_method(method(MethodType::Buy)).await.unwrap().id.unwrap();

    engine.add_method(first_id, method_id).await.unwrap();
    engine.add_method(second_id, method_id).await.unwrap();

    let first = engine.find_material(first_id).await.unwrap().unwrap();
    assert!(first.methods().is_empty());

    assert!(!engine.remove_method(first_id, method_id).await.unwrap());
    assert!(engine.remove_method(second_id, method_id).await.unwrap());

    let method = engine.find_method(method_id).await.unwrap().unwrap();
    assert!(method.material().is_none());
}

#[tokio::test]
async fn material_write_with_method_ids_replaces_membership() {
    let (engine, _db) = engine_with_db().await;
    let a = engine.save_method(method(MethodType::Buy)).await.unwrap().id.unwrap();
    let b = engine.save_method(method(MethodType::Make)).await.unwrap().id.unwrap();

    let saved = engine
        .save_material(MaterialData {
            method_ids: Some(vec![a]),
            ..material("thermostat")
        })
        .await
        .unwrap();
    assert_eq!(saved.methods().len(), 1);
    let id = saved.id().unwrap();

    let updated = engine
        .partial_update_material(
            id,
            MaterialData {
                method_ids: Some(vec![b]),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .unwrap();
    let ids: Vec<i64> = updated.methods().iter().filter_map(|m| m.id).collect();
    assert_eq!(ids, vec![b]);

    let untouched = engine
        .update_material(id, material("valve"))
        .await
        .unwrap();
    assert_eq!(untouched.methods().len(), 1);
}

#[tokio::test]
async fn delete_material_detaches_methods_and_is_idempotent() {
    let (engine, _db) = engine_with_db().await;
    let owner = engine.save_material(material("thermostat")).await.unwrap();
    let owner_id = owner.id().unwrap();
    let method = engine
        .save_method(MethodData {
            method_type: Some(MethodType::Make),
            material_id: Some(owner_id),
        })
        .await
        .unwrap();
    let method_id = method.id.unwrap();
    engine.find_method(method_id).await.unwrap();

    engine.delete_material(owner_id).await.unwrap();
    engine.delete_material(owner_id).await.unwrap();

    assert!(engine.find_material(owner_id).await.unwrap().is_none());
    assert!(!engine.material_exists(owner_id).await.unwrap());
    let orphan = engine.find_method(method_id).await.unwrap().unwrap();
    assert!(orphan.material().is_none());

    engine.delete_method(method_id).await.unwrap();
    engine.delete_method(method_id).await.unwrap();
    assert!(!engine.method_exists(method_id).await.unwrap());
}

#[tokio::test]
async fn find_all_pages_and_sorts() {
    let (engine, _db) = engine_with_db().await;
    for name in ["b", "a", "c", "e", "d"] {
        engine.save_material(material(name)).await.unwrap();
    }

    let page = engine
        .find_all_materials(&PageRequest::new(1, 2).sorted_by(SortOrder::asc("name")))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 5);
    assert_eq!(page.total_pages(), 3);
    let names: Vec<_> = page
        .content
        .iter()
        .filter_map(|m| m.name().map(str::to_string))
        .collect();
    assert_eq!(names, vec!["c", "d"]);

    let first = engine
        .find_all_materials(&PageRequest::new(0, 20).sorted_by(SortOrder::desc("id")))
        .await
        .unwrap();
    assert_eq!(first.content.first().and_then(|m| m.name()), Some("d"));

    let err = engine
        .find_all_materials(&PageRequest::default().sorted_by(SortOrder::asc("colour")))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Invalid(_)));
}

#[tokio::test]
async fn find_all_methods_carries_owners() {
    let (engine, _db) = engine_with_db().await;
    let owner = engine.save_material(material("thermostat")).await.unwrap();
    engine
        .save_method(MethodData {
            method_type: Some(MethodType::Buy),
            material_id: owner.id(),
        })
        .await
        .unwrap();
    engine.save_method(method(MethodType::Make)).await.unwrap();

    let page = engine
        .find_all_methods(&PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.content.len(), 2);
    assert!(page.content[0].belongs_to(&owner));
    assert!(page.content[1].material().is_none());
}
