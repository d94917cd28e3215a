//! Fixture-backed store doubles mirroring the mocked remote backend the
//! web tests run against.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use entity::bills;
use uuid::Uuid;

use crate::{BillStore, BillSubmission, CreatedProof, NewProof, StoreError, StoreResult};

pub const MOCK_FILE_URL: &str = "https://localhost:3456/images/test.jpg";
pub const MOCK_KEY: &str = "1234";

fn fixture(
    id: &str,
    expense_type: &str,
    name: &str,
    date: &str,
    amount: i32,
    status: &str,
) -> bills::Model {
    bills::Model {
        id: Uuid::new_v5(&Uuid::NAMESPACE_OID, id.as_bytes()),
        expense_type: Some(expense_type.to_string()),
        name: Some(name.to_string()),
        date: Some(date.to_string()),
        amount: Some(amount),
        vat: Some("80".to_string()),
        pct: Some(20),
        commentary: Some("séminaire billed".to_string()),
        file_url: MOCK_FILE_URL.to_string(),
        file_name: "preview-facture-free-201801-pdf-1.jpg".to_string(),
        status: status.to_string(),
        email: "a@a".to_string(),
        created_at: Utc::now().into(),
    }
}

/// The four canonical fixture bills, deliberately out of date order.
pub fn fixture_bills() -> Vec<bills::Model> {
    vec![
        fixture("bill-encore", "Hôtel et logement", "encore", "2004-04-04", 400, "pending"),
        fixture("bill-test1", "Transports", "test1", "2001-01-01", 100, "refused"),
        fixture("bill-test3", "Services en ligne", "test3", "2003-03-03", 300, "accepted"),
        fixture("bill-test2", "Restaurants et bars", "test2", "2002-02-02", 200, "refused"),
    ]
}

/// In-memory store returning the fixtures and recording call order.
#[derive(Default)]
pub struct MockStore {
    calls: Mutex<Vec<&'static str>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("mock call log poisoned").clone()
    }

    fn record(&self, call: &'static str) {
        self.calls.lock().expect("mock call log poisoned").push(call);
    }
}

#[async_trait]
impl BillStore for MockStore {
    async fn list(&self) -> StoreResult<Vec<bills::Model>> {
        self.record("list");
        Ok(fixture_bills())
    }

    async fn create(&self, _proof: NewProof) -> StoreResult<CreatedProof> {
        self.record("create");
        Ok(CreatedProof {
            file_url: MOCK_FILE_URL.to_string(),
            key: MOCK_KEY.to_string(),
        })
    }

    async fn update(&self, submission: BillSubmission) -> StoreResult<bills::Model> {
        self.record("update");
        Ok(bills::Model {
            id: Uuid::new_v5(&Uuid::NAMESPACE_OID, submission.key.as_bytes()),
            expense_type: Some(submission.expense_type),
            name: Some(submission.name),
            date: Some(submission.date),
            amount: Some(submission.amount),
            vat: Some(submission.vat),
            pct: Some(submission.pct),
            commentary: Some(submission.commentary),
            file_url: submission.file_url,
            file_name: submission.file_name,
            status: submission.status,
            email: submission.email,
            created_at: Utc::now().into(),
        })
    }
}

/// Store that rejects every call with the given status, for the error
/// branches of the page tests.
pub struct FailingStore {
    status: u16,
}

impl FailingStore {
    pub fn new(status: u16) -> Self {
        Self { status }
    }

    fn error(&self) -> StoreError {
        match self.status {
            404 => StoreError::NotFound,
            code => StoreError::backend(anyhow::anyhow!("mock backend failure ({code})")),
        }
    }
}

#[async_trait]
impl BillStore for FailingStore {
    async fn list(&self) -> StoreResult<Vec<bills::Model>> {
        Err(self.error())
    }

    async fn create(&self, _proof: NewProof) -> StoreResult<CreatedProof> {
        Err(self.error())
    }

    async fn update(&self, _submission: BillSubmission) -> StoreResult<bills::Model> {
        Err(self.error())
    }
}
