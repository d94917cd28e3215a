use sea_orm_migration::prelude::*;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS bills (
    id uuid PRIMARY KEY,
    expense_type text NULL,
    name text NULL,
    date text NULL,
    amount integer NULL,
    vat text NULL,
    pct integer NULL,
    commentary text NULL,
    file_url text NOT NULL,
    file_name text NOT NULL,
    status text NOT NULL DEFAULT 'pending',
    email text NOT NULL,
    created_at timestamptz NOT NULL DEFAULT now()
);

CREATE INDEX IF NOT EXISTS idx_bills_email ON bills (email);
CREATE INDEX IF NOT EXISTS idx_bills_date ON bills (date);
"#;

const DOWN_SQL: &str = "DROP TABLE IF EXISTS bills";

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(UP_SQL)
            .await
            .map(|_| ())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared(DOWN_SQL)
            .await
            .map(|_| ())
    }
}
