use serde::{Deserialize, Serialize};

use crate::core::types::NormalizedResult;

/// Caller-chosen correlation token, echoed back in the same JSON form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    Int(i64),
    Str(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestId::Int(n) => write!(f, "{n}"),
            RequestId::Str(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    Query,
    Transaction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientRequest {
    Query { id: RequestId, statement: String },
    Transaction { id: RequestId, statements: Vec<String> },
}

// Wire shape; every field optional so foreign messages deserialize and get
// filtered instead of failing.
#[derive(Debug, Deserialize)]
struct RawRequest {
    #[serde(rename = "type")]
    kind: Option<String>,
    id: Option<RequestId>,
    statement: Option<String>,
    statements: Option<Vec<String>>,
}

impl ClientRequest {
    /// `None` for anything that is not a well-formed bridge request.
    pub fn parse(data: &serde_json::Value) -> Option<Self> {
        if !data.is_object() {
            return None;
        }
        let raw = RawRequest::deserialize(data).ok()?;
        let id = raw.id?;
        match raw.kind.as_deref()? {
            "query" => {
                let statement = raw.statement.filter(|s| !s.is_empty())?;
                Some(ClientRequest::Query { id, statement })
            }
            "transaction" => {
                let statements = raw.statements.filter(|s| !s.is_empty())?;
                Some(ClientRequest::Transaction { id, statements })
            }
            _ => None,
        }
    }

    pub fn kind(&self) -> RequestKind {
        match self {
            ClientRequest::Query { .. } => RequestKind::Query,
            ClientRequest::Transaction { .. } => RequestKind::Transaction,
        }
    }

    pub fn id(&self) -> &RequestId {
        match self {
            ClientRequest::Query { id, .. } | ClientRequest::Transaction { id, .. } => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Single(NormalizedResult),
    Batch(Vec<NormalizedResult>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientResponse {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    pub id: RequestId,
    #[serde(flatten)]
    pub outcome: Outcome,
}

/// Exactly one of `data` or `error` ends up on the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Outcome {
    #[serde(rename = "data")]
    Data(ResponseData),
    #[serde(rename = "error")]
    Error(String),
}

impl ClientResponse {
    pub fn ok(kind: RequestKind, id: RequestId, data: ResponseData) -> Self {
        Self {
            kind,
            id,
            outcome: Outcome::Data(data),
        }
    }

    pub fn err(kind: RequestKind, id: RequestId, error: String) -> Self {
        Self {
            kind,
            id,
            outcome: Outcome::Error(error),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_query_and_transaction() {
        assert_eq!(
            ClientRequest::parse(&json!({"type": "query", "id": 1, "statement": "SELECT 1"})),
            Some(ClientRequest::Query {
                id: RequestId::Int(1),
                statement: "SELECT 1".into()
            })
        );
        assert_eq!(
            ClientRequest::parse(&json!({"type": "transaction", "id": "t-1", "statements": ["A", "B"]})),
            Some(ClientRequest::Transaction {
                id: RequestId::Str("t-1".into()),
                statements: vec!["A".into(), "B".into()]
            })
        );
    }

    #[test]
    fn ignores_foreign_and_incomplete_messages() {
        for msg in [
            json!("hello"),
            json!(null),
            json!([1, 2]),
            json!({"type": "ping", "id": 1}),
            json!({"type": "query", "id": 1}),
            json!({"type": "query", "id": 1, "statement": ""}),
            json!({"type": "query", "statement": "SELECT 1"}),
            json!({"type": "query", "id": 1.5, "statement": "SELECT 1"}),
            json!({"type": "query", "id": 1, "statement": 5}),
            json!({"type": "transaction", "id": 1}),
            json!({"type": "transaction", "id": 1, "statements": []}),
            json!({"type": "transaction", "id": 1, "statements": "SELECT 1"}),
            json!({"id": 1, "statement": "SELECT 1"}),
        ] {
            assert_eq!(ClientRequest::parse(&msg), None, "{msg}");
        }
    }

    #[test]
    fn extra_fields_are_tolerated() {
        let req = ClientRequest::parse(&json!({
            "type": "query", "id": 3, "statement": "SELECT 1", "source": "studio"
        }));
        assert!(req.is_some());
    }

    #[test]
    fn error_response_shape() {
        let r = ClientResponse::err(RequestKind::Transaction, RequestId::Int(2), "boom".into());
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"type": "transaction", "id": 2, "error": "boom"})
        );
    }

    #[test]
    fn data_response_echoes_string_id() {
        let r = ClientResponse::ok(
            RequestKind::Transaction,
            RequestId::Str("abc".into()),
            ResponseData::Batch(vec![]),
        );
        assert_eq!(
            serde_json::to_value(&r).unwrap(),
            json!({"type": "transaction", "id": "abc", "data": []})
        );
    }
}
