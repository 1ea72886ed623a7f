use super::error::Error;
use chrono::{DateTime, Utc};
use entity::messages::{Column, Entity};
use sea_orm::{entity::prelude::*, DatabaseConnection};

use log::*;

/// Delete every message created strictly before `cutoff`, returning how many rows went.
pub async fn delete_created_before(
    db: &DatabaseConnection,
    cutoff: DateTime<Utc>,
) -> Result<u64, Error> {
    let cutoff: DateTimeWithTimeZone = cutoff.into();
    debug!("Deleting messages created before {cutoff}");

    let result = Entity::delete_many()
        .filter(Column::CreatedAt.lt(cutoff))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

#[cfg(test)]
// We need to gate seaORM's mock feature behind conditional compilation because
// the feature removes the Clone trait implementation from seaORM's DatabaseConnection.
// see https://github.com/SeaQL/sea-orm/issues/830
#[cfg(feature = "mock")]
mod tests {
    use super::*;
    use crate::error::EntityApiErrorKind;
    use chrono::TimeZone;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, RuntimeErr, Transaction};

    #[tokio::test]
    async fn delete_created_before_returns_the_number_of_deleted_rows() -> Result<(), Error> {
        let cutoff = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_results(vec![MockExecResult {
                last_insert_id: 0,
                rows_affected: 7,
            }])
            .into_connection();

        let deleted = delete_created_before(&db, cutoff).await?;
        assert_eq!(deleted, 7);

        let expected_cutoff: DateTimeWithTimeZone = cutoff.into();
        assert_eq!(
            db.into_transaction_log(),
            [Transaction::from_sql_and_values(
                DatabaseBackend::Postgres,
                r#"DELETE FROM "messages" WHERE "messages"."created_at" < $1"#,
                [expected_cutoff.into()]
            )]
        );

        Ok(())
    }

    #[tokio::test]
    async fn delete_created_before_surfaces_database_failures() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_exec_errors(vec![DbErr::Conn(RuntimeErr::Internal(
                "connection refused".to_owned(),
            ))])
            .into_connection();

        let err = delete_created_before(&db, Utc::now()).await.unwrap_err();

        assert_eq!(err.error_kind, EntityApiErrorKind::SystemError);
    }
}
