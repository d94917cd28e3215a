//! Store round-trip against a real Postgres. Skipped unless
//! TEST_DATABASE_URL is set; the targeted database is migrated fresh.

use migration::{Migrator, MigratorTrait};
use platform_db::{DatabaseSettings, DbPool};
use platform_store::{BillStore, BillSubmission, DbStore, NewProof, StoreError};
use uuid::Uuid;

async fn setup_pg() -> Option<DbPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("skipping store tests: TEST_DATABASE_URL not set");
            return None;
        }
    };
    let pool = platform_db::connect(&DatabaseSettings::with_url(url))
        .await
        .ok()?;
    Migrator::refresh(&pool).await.ok()?;
    Some(pool)
}

fn test_store(pool: DbPool) -> DbStore {
    let dir = std::env::temp_dir().join(format!("frais-store-{}", Uuid::new_v4()));
    DbStore::new(pool, dir, "http://localhost:8080")
}

fn submission(key: &str) -> BillSubmission {
    BillSubmission {
        key: key.to_string(),
        expense_type: "Restaurants et bars".to_string(),
        name: "test".to_string(),
        date: "2021-09-01".to_string(),
        amount: 100,
        vat: "10".to_string(),
        pct: 20,
        commentary: "test".to_string(),
        file_url: "http://localhost:8080/uploads/test.jpg".to_string(),
        file_name: "test.jpg".to_string(),
        status: "pending".to_string(),
        email: "e@e".to_string(),
    }
}

#[tokio::test]
async fn create_then_update_then_list_roundtrip() {
    let Some(pool) = setup_pg().await else {
        return;
    };
    let store = test_store(pool);

    let created = store
        .create(NewProof {
            email: "e@e".to_string(),
            file_name: "facturefreemobile.jpg".to_string(),
            bytes: b"fake image bytes".to_vec(),
        })
        .await
        .expect("create");
    assert!(created.file_url.contains("/uploads/"));
    assert!(created.file_url.ends_with(".jpg"));

    let bill = store
        .update(submission(&created.key))
        .await
        .expect("update");
    assert_eq!(bill.status, "pending");
    assert_eq!(bill.amount, Some(100));
    assert_eq!(bill.email, "e@e");

    let rows = store.list().await.expect("list");
    assert!(rows.iter().any(|row| row.id.to_string() == created.key));
}

#[tokio::test]
async fn update_with_unknown_key_is_a_404() {
    let Some(pool) = setup_pg().await else {
        return;
    };
    let store = test_store(pool);
    let err = store
        .update(submission(&Uuid::new_v4().to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound));
    assert_eq!(err.to_string(), "Erreur 404");
}
