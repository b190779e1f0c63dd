//! Program CRUD operations.

use epg_protocol::{Program, ProgramId, ProgramPatch};
use log::trace;
use rusqlite::types::Type;
use rusqlite::{params, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Database, DatabaseError, Result};
use crate::store::{ProgramStore, StoreError};

const SELECT_PROGRAM: &str = "SELECT id, network_id, service_id, event_id, start_at, duration,
        is_free, is_present_following, name, description, video, genres, audios, series,
        related_items, extended
     FROM programs";

fn to_json<T: Serialize>(value: &Option<T>) -> Result<Option<String>> {
    value
        .as_ref()
        .map(serde_json::to_string)
        .transpose()
        .map_err(DatabaseError::from)
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        serde_json::from_str(&t)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn sql_id(id: ProgramId) -> i64 {
    id.as_u64() as i64
}

impl Database {
    /// Insert a new program.
    pub fn insert_program(&self, program: &Program) -> Result<()> {
        self.conn.execute(
            "INSERT INTO programs (
                id, network_id, service_id, event_id, start_at, duration,
                is_free, is_present_following, name, description, video, genres,
                audios, series, related_items, extended
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16)",
            params![
                sql_id(program.id),
                program.network_id as i32,
                program.service_id as i32,
                program.event_id as i32,
                program.start_at,
                program.duration,
                program.is_free,
                program.is_present_following,
                program.name,
                program.description,
                to_json(&program.video)?,
                to_json(&program.genres)?,
                to_json(&program.audios)?,
                to_json(&program.series)?,
                to_json(&program.related_items)?,
                to_json(&program.extended)?,
            ],
        )?;
        Ok(())
    }

    /// Get program by id.
    pub fn get_program(&self, id: ProgramId) -> Result<Option<Program>> {
        let mut stmt = self.conn.prepare(&format!("{} WHERE id = ?1", SELECT_PROGRAM))?;

        match stmt.query_row([sql_id(id)], Self::row_to_program) {
            Ok(program) => Ok(Some(program)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Apply a partial update to one program.
    pub fn update_program(&self, id: ProgramId, patch: &ProgramPatch) -> Result<()> {
        let changed = match patch {
            ProgramPatch::Schedule(s) => self.conn.execute(
                "UPDATE programs SET start_at = ?2, duration = ?3, is_free = ?4,
                    is_present_following = ?5, updated_at = strftime('%s', 'now')
                 WHERE id = ?1",
                params![sql_id(id), s.start_at, s.duration, s.is_free, s.is_present_following],
            )?,
            ProgramPatch::ShortEvent { name, description } => self.conn.execute(
                "UPDATE programs SET name = ?2, description = ?3, updated_at = strftime('%s', 'now')
                 WHERE id = ?1",
                params![sql_id(id), name, description],
            )?,
            ProgramPatch::Extended(map) => self.update_json_column(id, "extended", map)?,
            ProgramPatch::Video(video) => self.update_json_column(id, "video", video)?,
            ProgramPatch::Genres(genres) => self.update_json_column(id, "genres", genres)?,
            ProgramPatch::Audios(audios) => self.update_json_column(id, "audios", audios)?,
            ProgramPatch::Series(series) => self.update_json_column(id, "series", series)?,
            ProgramPatch::RelatedItems(items) => {
                self.update_json_column(id, "related_items", items)?
            }
        };

        if changed == 0 {
            return Err(DatabaseError::ProgramNotFound(id));
        }
        trace!("programs row {} updated ({})", id, patch.kind());
        Ok(())
    }

    fn update_json_column<T: Serialize>(
        &self,
        id: ProgramId,
        column: &'static str,
        value: &T,
    ) -> Result<usize> {
        let json = serde_json::to_string(value)?;
        let sql = format!(
            "UPDATE programs SET {} = ?2, updated_at = strftime('%s', 'now') WHERE id = ?1",
            column
        );
        Ok(self.conn.execute(&sql, params![sql_id(id), json])?)
    }

    /// Total number of stored programs.
    pub fn program_count(&self) -> Result<i64> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM programs", [], |row| row.get(0))?;
        Ok(count)
    }

    /// Programs of one service, ordered by start time.
    pub fn programs_for_service(&self, network_id: u16, service_id: u16) -> Result<Vec<Program>> {
        let mut stmt = self.conn.prepare(&format!(
            "{} WHERE network_id = ?1 AND service_id = ?2 ORDER BY start_at, event_id",
            SELECT_PROGRAM
        ))?;

        let programs = stmt
            .query_map(
                params![network_id as i32, service_id as i32],
                Self::row_to_program,
            )?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(programs)
    }

    fn row_to_program(row: &Row<'_>) -> rusqlite::Result<Program> {
        Ok(Program {
            id: ProgramId(row.get::<_, i64>(0)? as u64),
            network_id: row.get::<_, i32>(1)? as u16,
            service_id: row.get::<_, i32>(2)? as u16,
            event_id: row.get::<_, i32>(3)? as u16,
            start_at: row.get(4)?,
            duration: row.get(5)?,
            is_free: row.get(6)?,
            is_present_following: row.get(7)?,
            name: row.get(8)?,
            description: row.get(9)?,
            video: json_column(row, 10)?,
            genres: json_column(row, 11)?,
            audios: json_column(row, 12)?,
            series: json_column(row, 13)?,
            related_items: json_column(row, 14)?,
            extended: json_column(row, 15)?,
        })
    }
}

impl ProgramStore for Database {
    fn get(&self, id: ProgramId) -> std::result::Result<Option<Program>, StoreError> {
        Ok(self.get_program(id)?)
    }

    fn add(&mut self, program: Program) -> std::result::Result<(), StoreError> {
        let id = program.id;
        self.insert_program(&program).map_err(|e| match e {
            DatabaseError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                StoreError::AlreadyExists(id)
            }
            other => other.into(),
        })
    }

    fn update(&mut self, id: ProgramId, patch: ProgramPatch) -> std::result::Result<(), StoreError> {
        Ok(self.update_program(id, &patch)?)
    }
}
