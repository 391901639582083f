pub mod cell;
pub mod worksheet;

pub use cell::{Cell, ComputeCell, TextCell};
pub use worksheet::{Worksheet, WorksheetMeta};
