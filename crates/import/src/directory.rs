//! Employee lookup.
//!
//! The employees table is owned by a separate subsystem; importers only
//! read it. Absence is an `Option`, never an error: a sheet name with no
//! directory match degrades to a name-only row.

use rusqlite::{params, Connection, OptionalExtension};

pub type EmployeeId = i64;

pub trait EmployeeDirectory {
    /// Look up an employee by normalized name key (full name or nickname).
    fn find_by_name_key(&self, key: &str) -> Option<EmployeeId>;
}

/// Directory backed by the `employees` table.
pub struct SqliteDirectory<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteDirectory<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl EmployeeDirectory for SqliteDirectory<'_> {
    fn find_by_name_key(&self, key: &str) -> Option<EmployeeId> {
        if key.is_empty() {
            return None;
        }
        self.conn
            .query_row(
                "SELECT id FROM employees
                 WHERE name_key = ?1
                    OR nickname_key = ?1
                    OR nickname_key_2 = ?1
                    OR nickname_key_3 = ?1
                 LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .ok()
            .flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::init_schema;

    #[test]
    fn sqlite_directory_matches_any_nickname() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO employees (id, name, name_key, nickname_key, nickname_key_2)
             VALUES (7, 'Samuel Lopka', 'samuel lopka', 'sam lopka', 'sam')",
            [],
        )
        .unwrap();

        let dir = SqliteDirectory::new(&conn);
        assert_eq!(dir.find_by_name_key("samuel lopka"), Some(7));
        assert_eq!(dir.find_by_name_key("sam lopka"), Some(7));
        assert_eq!(dir.find_by_name_key("sam"), Some(7));
        assert_eq!(dir.find_by_name_key("nobody"), None);
        assert_eq!(dir.find_by_name_key(""), None);
    }
}
