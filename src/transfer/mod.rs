//! Moving titles in and out of a vault: the line format, the importer and
//! the metadata refresher.

pub mod import;
pub mod line;
pub mod refresh;

pub use import::{ImportReport, import_text};
pub use line::{ImportLine, export_items, format_line, parse_line, parse_lines};
pub use refresh::{RefreshReport, refresh_metadata};
