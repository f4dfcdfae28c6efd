use serde::{Deserialize, Serialize, Serializer};

/// One row object, keyed by deduplicated column name in header order.
pub type DbRow = serde_json::Map<String, serde_json::Value>;

/// Raw outcome of one statement as the executor reports it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriverResult {
    pub columns: Vec<String>,
    #[serde(default)]
    pub column_types: Vec<Option<String>>,
    pub rows: Vec<Vec<serde_json::Value>>,
    #[serde(default)]
    pub rows_affected: u64,
    #[serde(default)]
    pub last_insert_rowid: Option<i64>,
}

/// Portable column classification. Serialized as the studio's numeric code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnType {
    Text = 1,
    Integer = 2,
    Real = 3,
    Blob = 4,
}

impl Serialize for ColumnType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnHeader {
    pub name: String,
    pub display_name: String,
    pub original_type: Option<String>,
    #[serde(rename = "type")]
    pub column_type: ColumnType,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryStat {
    pub rows_affected: u64,
    pub rows_read: Option<u64>,
    pub rows_written: Option<u64>,
    pub query_duration_ms: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedResult {
    pub headers: Vec<ColumnHeader>,
    pub rows: Vec<DbRow>,
    pub stat: QueryStat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_insert_rowid: Option<i64>,
}
