// ==========================================
// Wellbeing Waitlist - Patient Repository (SQLite)
// ==========================================
// Rule: no business logic here, data access only
// Table: patient (see db::ensure_schema)
// ==========================================

use crate::db::{ensure_schema, open_sqlite_connection};
use crate::domain::patient::Patient;
use crate::domain::types::Category;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::gateway::PersistenceGateway;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult};
use std::sync::{Arc, Mutex};

const SELECT_COLUMNS: &str = r#"
    SELECT patient_id, name, age, category, complaint,
           urgency_score, arrival_time, resolved, resolved_at
    FROM patient
"#;

// ==========================================
// PatientRepository
// ==========================================
/// SQLite-backed [`PersistenceGateway`].
pub struct PatientRepository {
    conn: Arc<Mutex<Connection>>,
}

impl PatientRepository {
    /// Open `db_path` and make sure the schema exists.
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Build from a shared connection. The caller owns schema setup.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    fn query_patients(&self, sql: &str, resolved: Option<bool>) -> RepositoryResult<Vec<Patient>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = match resolved {
            Some(flag) => stmt.query_map(params![flag as i32], Self::map_row_to_patient)?,
            None => stmt.query_map([], Self::map_row_to_patient)?,
        };

        let mut patients = Vec::new();
        for row in rows {
            patients.push(row?);
        }
        Ok(patients)
    }

    fn map_row_to_patient(row: &rusqlite::Row) -> SqliteResult<Patient> {
        let category: String = row.get(3)?;
        let category = category
            .parse::<Category>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, e.into()))?;

        Ok(Patient {
            patient_id: row.get(0)?,
            name: row.get(1)?,
            age: row.get(2)?,
            category,
            complaint: row.get(4)?,
            urgency_score: row.get(5)?,
            arrival_time: parse_timestamp(6, &row.get::<_, String>(6)?)?,
            resolved: row.get::<_, i32>(7)? != 0,
            resolved_at: row
                .get::<_, Option<String>>(8)?
                .map(|s| parse_timestamp(8, &s))
                .transpose()?,
        })
    }
}

/// Fixed-width UTC form so text ordering in SQL matches time ordering.
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(idx: usize, raw: &str) -> SqliteResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl PersistenceGateway for PatientRepository {
    fn save(&self, patient: &Patient) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO patient (
                patient_id, name, age, category, complaint,
                urgency_score, arrival_time, resolved, resolved_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(patient_id) DO UPDATE SET
                urgency_score = excluded.urgency_score,
                resolved = excluded.resolved,
                resolved_at = excluded.resolved_at,
                updated_at = excluded.updated_at
            "#,
            params![
                patient.patient_id,
                patient.name,
                patient.age,
                patient.category.as_str(),
                patient.complaint,
                patient.urgency_score,
                format_timestamp(&patient.arrival_time),
                patient.resolved as i32,
                patient.resolved_at.as_ref().map(format_timestamp),
                format_timestamp(&Utc::now()),
            ],
        )?;
        Ok(())
    }

    fn mark_resolved(&self, patient_id: &str) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        let now = format_timestamp(&Utc::now());
        let affected = conn.execute(
            "UPDATE patient SET resolved = 1, resolved_at = ?2, updated_at = ?2 WHERE patient_id = ?1",
            params![patient_id, now],
        )?;

        if affected == 0 {
            return Err(RepositoryError::NotFound {
                entity: "Patient".to_string(),
                id: patient_id.to_string(),
            });
        }
        Ok(())
    }

    fn list_unresolved(&self, ordered_by_urgency_desc: bool) -> RepositoryResult<Vec<Patient>> {
        let order = if ordered_by_urgency_desc {
            "ORDER BY urgency_score DESC, arrival_time ASC, rowid ASC"
        } else {
            "ORDER BY arrival_time ASC, rowid ASC"
        };
        let sql = format!("{} WHERE resolved = ?1 {}", SELECT_COLUMNS, order);
        self.query_patients(&sql, Some(false))
    }

    fn list_all(&self) -> RepositoryResult<Vec<Patient>> {
        let sql = format!("{} ORDER BY urgency_score DESC, arrival_time ASC", SELECT_COLUMNS);
        self.query_patients(&sql, None)
    }

    fn find_by_id(&self, patient_id: &str) -> RepositoryResult<Option<Patient>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE patient_id = ?1", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let result = stmt.query_row(params![patient_id], Self::map_row_to_patient);

        match result {
            Ok(patient) => Ok(Some(patient)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn list_by_resolved(&self, resolved: bool) -> RepositoryResult<Vec<Patient>> {
        let sql = format!(
            "{} WHERE resolved = ?1 ORDER BY urgency_score DESC, arrival_time ASC",
            SELECT_COLUMNS
        );
        self.query_patients(&sql, Some(resolved))
    }

    fn delete(&self, patient_id: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let affected = conn.execute("DELETE FROM patient WHERE patient_id = ?1", params![patient_id])?;
        Ok(affected > 0)
    }
}
