use thiserror::Error;

/// Misuse of a [`ResultTable`](super::ResultTable).
///
/// These are programming errors in the code driving the table; they are
/// returned to the caller instead of being papered over.
#[derive(Debug, Error)]
pub enum TableError {
    /// A row operation was attempted before any row was appended
    #[error("no rows in table")]
    NoRows,

    /// A row index past the end of the table
    #[error("row {0} out of range")]
    RowOutOfRange(usize),

    /// A column id that was never declared
    #[error("unknown column '{0}'")]
    UnknownColumn(String),

    /// The same column id was declared twice
    #[error("duplicate column '{0}'")]
    DuplicateColumn(String),

    /// An empty column id
    #[error("empty column id")]
    EmptyColumnId,

    /// Label and key lists of different lengths
    #[error("{labels} labels but {keys} keys")]
    SpecMismatch { labels: usize, keys: usize },

    /// A cell whose text would break the markdown table (`|`, `\n` or `\r`).
    /// `row` is `None` for the header and summary lines.
    #[error("cell in column '{column}' (row {row:?}) contains markdown-breaking characters: {text:?}")]
    UnsafeCell { row: Option<usize>, column: String, text: String },

    #[error("failed to write table: {0}")]
    Io(#[from] std::io::Error),
}
