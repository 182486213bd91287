use crate::SqlWriter;

/// Backend description: its name and the SQL dialect writer.
pub trait Driver: Default + Send + Sync {
    type SqlWriter: SqlWriter + Send + Sync;

    const NAME: &'static str;

    fn sql_writer(&self) -> Self::SqlWriter;
}
