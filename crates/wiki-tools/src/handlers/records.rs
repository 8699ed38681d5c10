//! Tools genéricos de inspección del store.
//!
//! Lectura cruda por nombre de tabla, útil para que el agente explore el
//! backend sin conocer el tool específico de cada entidad. El nombre se
//! resuelve contra el conjunto fijo de tablas; cualquier otro es
//! `invalid_table`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use wiki_core::Table;

use super::{parse_payload, record_or_null};
use crate::context::ToolContext;
use crate::definition::{ToolDefinition, ToolHandler};
use crate::error::ToolError;

pub fn all() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(GetRecord), Box::new(ListRecords)]
}

pub struct GetRecord;

#[derive(Deserialize)]
struct GetRecordInput {
    table: String,
    record_id: String,
}

#[async_trait]
impl ToolHandler for GetRecord {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("get_record",
                            "Raw lookup of a record by table name and id. Returns null when missing.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "table": { "type": "string" },
                                    "record_id": { "type": "string" }
                                },
                                "required": ["table", "record_id"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: GetRecordInput = parse_payload(payload)?;
        let table = Table::parse(&input.table)?;
        let store = ctx.store.read().await;
        Ok(record_or_null(store.get(table, &input.record_id)))
    }
}

pub struct ListRecords;

#[derive(Deserialize)]
struct ListRecordsInput {
    table: String,
    /// Filtro multi-campo con la política permisiva del store: un registro
    /// sin el campo también pasa.
    #[serde(default)]
    filters: serde_json::Map<String, Value>,
}

#[async_trait]
impl ToolHandler for ListRecords {
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::new("list_records",
                            "Raw multi-field filter over a table (records lacking a filtered field pass). Empty filters list the whole table.",
                            json!({
                                "type": "object",
                                "properties": {
                                    "table": { "type": "string" },
                                    "filters": { "type": "object" }
                                },
                                "required": ["table"]
                            }))
    }

    async fn execute(&self, ctx: &ToolContext, payload: Value) -> Result<Value, ToolError> {
        let input: ListRecordsInput = parse_payload(payload)?;
        let table = Table::parse(&input.table)?;
        let store = ctx.store.read().await;
        let records = store.filter_records(table, &input.filters);
        Ok(json!({ "count": records.len(), "records": records }))
    }
}
