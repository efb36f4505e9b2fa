//! Spreadsheet read/write tools for an external agent
//!
//! The toolkit owns one connected document. Tool calls arrive as a name plus
//! JSON arguments and return a JSON payload.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{Error, Result};
use crate::providers::SpreadsheetDocument;

use super::a1::{A1Range, CellRef};
use super::data_type::suggest_data_type;

/// Tool description handed to an agent
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

/// A tool invocation requested by an agent
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCall {
    pub name: String,
    #[serde(default)]
    pub arguments: Value,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadCellParams {
    sheet_name: String,
    cell: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WriteCellParams {
    sheet_name: String,
    cell: String,
    value: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ReadValuesParams {
    sheet_name: String,
    range: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WriteValuesParams {
    sheet_name: String,
    range: String,
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SuggestDataTypeParams {
    data: String,
}

fn parse_arguments<T>(tool: &str, arguments: Value) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    serde_json::from_value(arguments)
        .map_err(|e| Error::invalid_argument(format!("Bad arguments for {}: {}", tool, e)))
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Read/write tools over one connected spreadsheet
pub struct SheetToolkit {
    document: Box<dyn SpreadsheetDocument>,
}

impl SheetToolkit {
    pub fn new(document: Box<dyn SpreadsheetDocument>) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &dyn SpreadsheetDocument {
        self.document.as_ref()
    }

    fn ensure_sheet(&self, sheet_name: &str) -> Result<()> {
        match self.document.sheet_by_title(sheet_name) {
            Some(_) => Ok(()),
            None => Err(Error::invalid_argument(format!(
                "Spreadsheet {} has no sheet named {:?}",
                self.document.file_id(),
                sheet_name
            ))),
        }
    }

    /// Value of one cell as text (`""` when blank)
    pub async fn read_cell(&self, sheet_name: &str, cell: &str) -> Result<String> {
        self.ensure_sheet(sheet_name)?;
        let cell = CellRef::parse(cell)?;

        let grid = self.document.read_range(sheet_name, &cell.to_string()).await?;
        Ok(grid
            .first()
            .and_then(|row| row.first())
            .map(display_value)
            .unwrap_or_default())
    }

    /// Write one value, interpreted as if typed by a user
    pub async fn write_cell(&self, sheet_name: &str, cell: &str, value: &str) -> Result<String> {
        self.ensure_sheet(sheet_name)?;
        let cell = CellRef::parse(cell)?;

        self.document
            .write_range(
                sheet_name,
                &cell.to_string(),
                vec![vec![Value::String(value.to_string())]],
            )
            .await?;
        Ok(format!("Wrote {:?} to {} in sheet {}", value, cell, sheet_name))
    }

    /// Row-major values of a range; trailing blanks may be omitted
    pub async fn read_values(&self, sheet_name: &str, range: &str) -> Result<Vec<Vec<Value>>> {
        self.ensure_sheet(sheet_name)?;
        let range = A1Range::parse(range)?;
        self.document.read_range(sheet_name, &range.to_string()).await
    }

    /// Write a block of values; a multi-cell range must be large enough to hold them
    pub async fn write_values(
        &self,
        sheet_name: &str,
        range: &str,
        values: Vec<Vec<Value>>,
    ) -> Result<String> {
        self.ensure_sheet(sheet_name)?;
        let range = A1Range::parse(range)?;

        if !range.is_single_cell() {
            let widest = values.iter().map(Vec::len).max().unwrap_or(0);
            if values.len() > range.rows() || widest > range.cols() {
                return Err(Error::invalid_argument(format!(
                    "{} rows x {} columns do not fit in range {}",
                    values.len(),
                    widest,
                    range
                )));
            }
        }

        self.document
            .write_range(sheet_name, &range.to_string(), values)
            .await?;
        Ok(format!("Wrote range {} in sheet {}", range, sheet_name))
    }

    /// Tool definitions with JSON-schema parameters
    pub fn definitions() -> Vec<ToolDefinition> {
        let sheet_name = json!({"type": "string", "description": "Sheet (tab) title"});
        vec![
            ToolDefinition {
                name: "read_cell",
                description: "Read the value of one cell given its sheet and A1 reference (e.g. \"A1\").",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "sheet_name": sheet_name,
                        "cell": {"type": "string", "description": "Cell in A1 notation"}
                    },
                    "required": ["sheet_name", "cell"]
                }),
            },
            ToolDefinition {
                name: "write_cell",
                description: "Write a value into one cell given its sheet and A1 reference.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "sheet_name": sheet_name,
                        "cell": {"type": "string", "description": "Cell in A1 notation"},
                        "value": {"type": "string", "description": "Value to write"}
                    },
                    "required": ["sheet_name", "cell", "value"]
                }),
            },
            ToolDefinition {
                name: "read_values",
                description: "Read the values of a range (e.g. \"A1:C5\") as a list of rows.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "sheet_name": sheet_name,
                        "range": {"type": "string", "description": "Range in A1 notation"}
                    },
                    "required": ["sheet_name", "range"]
                }),
            },
            ToolDefinition {
                name: "write_values",
                description: "Write a list of rows into a range (e.g. \"A1:C5\").",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "sheet_name": sheet_name,
                        "range": {"type": "string", "description": "Range in A1 notation"},
                        "values": {
                            "type": "array",
                            "items": {"type": "array", "items": {}},
                            "description": "Rows of cell values"
                        }
                    },
                    "required": ["sheet_name", "range", "values"]
                }),
            },
            ToolDefinition {
                name: "suggest_data_type",
                description: "Suggest a data type (integer, float, boolean, date, string) for a raw value.",
                parameters: json!({
                    "type": "object",
                    "properties": {
                        "data": {"type": "string", "description": "Raw cell text"}
                    },
                    "required": ["data"]
                }),
            },
        ]
    }

    /// Dispatch a tool call by name
    pub async fn call(&self, call: ToolCall) -> Result<Value> {
        tracing::debug!("Tool call: {}", call.name);
        let name = call.name.as_str();

        match name {
            "read_cell" => {
                let p: ReadCellParams = parse_arguments(name, call.arguments)?;
                Ok(json!({ "value": self.read_cell(&p.sheet_name, &p.cell).await? }))
            }
            "write_cell" => {
                let p: WriteCellParams = parse_arguments(name, call.arguments)?;
                Ok(json!({ "message": self.write_cell(&p.sheet_name, &p.cell, &p.value).await? }))
            }
            "read_values" => {
                let p: ReadValuesParams = parse_arguments(name, call.arguments)?;
                Ok(json!({ "values": self.read_values(&p.sheet_name, &p.range).await? }))
            }
            "write_values" => {
                let p: WriteValuesParams = parse_arguments(name, call.arguments)?;
                let message = self.write_values(&p.sheet_name, &p.range, p.values).await?;
                Ok(json!({ "message": message }))
            }
            "suggest_data_type" => {
                let p: SuggestDataTypeParams = parse_arguments(name, call.arguments)?;
                Ok(json!({ "data_type": suggest_data_type(&p.data) }))
            }
            other => Err(Error::invalid_argument(format!("Unknown tool: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockDocument;
    use crate::types::SheetInfo;

    fn toolkit() -> SheetToolkit {
        let document = MockDocument::new("F1", "Stock").with_sheet(
            SheetInfo::new(0, "Products", 0),
            vec![
                vec![json!("Product"), json!("Qty"), json!("Price")],
                vec![json!("Pen"), json!(10), json!("1.5")],
            ],
        );
        SheetToolkit::new(Box::new(document))
    }

    #[tokio::test]
    async fn test_read_and_write_cell() {
        let toolkit = toolkit();
        assert_eq!(toolkit.read_cell("Products", "A2").await.unwrap(), "Pen");
        assert_eq!(toolkit.read_cell("Products", "B2").await.unwrap(), "10");
        assert_eq!(toolkit.read_cell("Products", "Z99").await.unwrap(), "");

        toolkit.write_cell("Products", "D1", "Total").await.unwrap();
        assert_eq!(toolkit.read_cell("Products", "D1").await.unwrap(), "Total");
    }

    #[tokio::test]
    async fn test_read_and_write_values() {
        let toolkit = toolkit();
        toolkit
            .write_values(
                "Products",
                "A3:C4",
                vec![
                    vec![json!("Ink"), json!(3), json!("4")],
                    vec![json!("Pad"), json!(7), json!("2")],
                ],
            )
            .await
            .unwrap();

        let values = toolkit.read_values("Products", "A3:B4").await.unwrap();
        assert_eq!(values, vec![vec![json!("Ink"), json!(3)], vec![json!("Pad"), json!(7)]]);
    }

    #[tokio::test]
    async fn test_write_values_must_fit_range() {
        let toolkit = toolkit();
        let result = toolkit
            .write_values("Products", "A1:B1", vec![vec![json!(1), json!(2), json!(3)]])
            .await;
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[tokio::test]
    async fn test_unknown_sheet_and_bad_cell() {
        let toolkit = toolkit();
        assert!(matches!(
            toolkit.read_cell("Missing", "A1").await,
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            toolkit.read_cell("Products", "1A").await,
            Err(Error::InvalidArgument(_))
        ));
    }

    #[tokio::test]
    async fn test_dispatch_by_name() {
        let toolkit = toolkit();

        let value = toolkit
            .call(ToolCall {
                name: "read_cell".to_string(),
                arguments: json!({"sheet_name": "Products", "cell": "C1"}),
            })
            .await
            .unwrap();
        assert_eq!(value, json!({"value": "Price"}));

        let value = toolkit
            .call(ToolCall {
                name: "suggest_data_type".to_string(),
                arguments: json!({"data": "12/05/2024"}),
            })
            .await
            .unwrap();
        assert_eq!(value, json!({"data_type": "date"}));

        let unknown = toolkit
            .call(ToolCall {
                name: "delete_sheet".to_string(),
                arguments: json!({}),
            })
            .await;
        assert!(matches!(unknown, Err(Error::InvalidArgument(_))));

        let bad_args = toolkit
            .call(ToolCall {
                name: "read_cell".to_string(),
                arguments: json!({"sheet": "Products"}),
            })
            .await;
        assert!(matches!(bad_args, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_definitions_cover_every_tool() {
        let names: Vec<&str> = SheetToolkit::definitions().iter().map(|d| d.name).collect();
        assert_eq!(
            names,
            vec!["read_cell", "write_cell", "read_values", "write_values", "suggest_data_type"]
        );
        for definition in SheetToolkit::definitions() {
            assert_eq!(definition.parameters["type"], "object");
        }
    }
}
