use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;

use crate::Result;

/// Unicode-aware lowercasing. SQLite's own `lower()` and `LIKE` only fold ASCII.
pub fn fold_case(text: &str) -> String {
    text.to_lowercase()
}

/// Register the scalar functions the queries rely on. Runs on every new
/// connection, before any query.
pub fn register(conn: &Connection) -> Result<()> {
    conn.create_scalar_function(
        "fold_case",
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let text: String = ctx.get(0)?;
            Ok(fold_case(&text))
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_beyond_ascii() {
        assert_eq!(fold_case("Über ÇA"), "über ça");
        assert_eq!(fold_case("ΣΟΦΙΑ"), "σοφια");
    }

    #[test]
    fn sql_function_matches_rust_folding() {
        let conn = Connection::open_in_memory().unwrap();
        register(&conn).unwrap();

        let folded: String = conn
            .query_row("SELECT fold_case('Über Alles')", [], |r| r.get(0))
            .unwrap();
        assert_eq!(folded, "über alles");
    }
}
