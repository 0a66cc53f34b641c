//! Database backend detection.

use std::fmt;

/// Backends the service can store books in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    PostgreSQL,
    /// Includes MariaDB
    MySQL,
    SQLite,
}

impl DatabaseType {
    /// Detect the backend from a URL scheme (case-insensitive).
    pub fn from_connection_string(connection_string: &str) -> Option<Self> {
        let (scheme, _) = connection_string.split_once(':')?;
        match scheme.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" => Some(Self::PostgreSQL),
            "mysql" | "mariadb" => Some(Self::MySQL),
            "sqlite" => Some(Self::SQLite),
            _ => None,
        }
    }
}

impl fmt::Display for DatabaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::PostgreSQL => "PostgreSQL",
            Self::MySQL => "MySQL",
            Self::SQLite => "SQLite",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_detection() {
        let cases = [
            ("postgres://localhost/db", Some(DatabaseType::PostgreSQL)),
            ("postgresql://localhost/db", Some(DatabaseType::PostgreSQL)),
            ("MySQL://localhost/db", Some(DatabaseType::MySQL)),
            ("mariadb://localhost/db", Some(DatabaseType::MySQL)),
            ("sqlite:library.db", Some(DatabaseType::SQLite)),
            ("sqlite://library.db", Some(DatabaseType::SQLite)),
            ("redis://localhost", None),
            ("library.db", None),
        ];
        for (url, expected) in cases {
            assert_eq!(DatabaseType::from_connection_string(url), expected, "{url}");
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(DatabaseType::MySQL.to_string(), "MySQL");
        assert_eq!(DatabaseType::SQLite.to_string(), "SQLite");
    }
}
