//! Dashboard lookups

use crate::errors::{from_rusqlite, Result};
use crate::session::SqlStore;
use dashq_core::dashboard::{Dashboard, DashboardSource};
use dashq_core::errors::{DashqError, ExError};
use rusqlite::{Connection, OptionalExtension};

pub struct DashboardRepo;

impl DashboardRepo {
    /// Fetch a dashboard by `(org_id, uid)`
    ///
    /// ## Errors
    ///
    /// - `DashboardNotFound`: no row for this org and uid
    /// - `Persistence`: the store failed
    pub fn get_dashboard(conn: &Connection, org_id: i64, uid: &str) -> Result<Dashboard> {
        let row = conn
            .query_row(
                "SELECT id, org_id, uid, title, data FROM dashboard WHERE org_id = ?1 AND uid = ?2",
                rusqlite::params![org_id, uid],
                |row| {
                    Ok(Dashboard {
                        id: row.get(0)?,
                        org_id: row.get(1)?,
                        uid: row.get(2)?,
                        title: row.get(3)?,
                        data: row.get(4)?,
                    })
                },
            )
            .optional()
            .map_err(from_rusqlite)?;

        row.ok_or_else(|| {
            DashqError::DashboardNotFound {
                dashboard_uid: uid.to_string(),
            }
            .into()
        })
    }

    /// Insert or replace a dashboard; returns its id
    pub fn upsert_dashboard(
        conn: &Connection,
        org_id: i64,
        uid: &str,
        title: &str,
        data: Option<&str>,
    ) -> Result<i64> {
        conn.query_row(
            "INSERT INTO dashboard (org_id, uid, title, data) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(org_id, uid) DO UPDATE SET title = excluded.title, data = excluded.data
             RETURNING id",
            rusqlite::params![org_id, uid, title, data],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }
}

impl DashboardSource for SqlStore {
    fn get_dashboard(&self, org_id: i64, uid: &str) -> std::result::Result<Dashboard, ExError> {
        self.with_session(|conn| DashboardRepo::get_dashboard(conn, org_id, uid))
    }
}
