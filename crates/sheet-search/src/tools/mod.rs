//! Spreadsheet actions exposed to an agent

pub mod a1;
mod data_type;
mod toolkit;

pub use a1::{A1Range, CellRef};
pub use data_type::{suggest_data_type, DataType};
pub use toolkit::{SheetToolkit, ToolCall, ToolDefinition};
