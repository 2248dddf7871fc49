//! Test suite ingestion
//!
//! Workbook → [`RawTable`] → [`TestSuite`].

mod case;
mod loader;
mod table;

pub use case::{TestCase, TestSuite};
pub use loader::{load, load_path, Column};
pub use table::{read_workbook, RawRow, RawTable, SheetFormat};
