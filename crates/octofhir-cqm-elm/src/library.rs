//! ELM library documents
//!
//! Only the parts of an ELM library the indexer needs are typed: the
//! identifier, the include table and the statement definitions. Statement
//! bodies stay as JSON so every node's `localId` survives untouched.

use std::io::Read;

use octofhir_cqm_types::LocalId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::annotation::Annotation;
use crate::error::{ElmError, ElmResult};

// ============================================================================
// Identifiers and Includes
// ============================================================================

/// Library identifier with optional version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionedIdentifier {
    /// Identifier
    pub id: String,
    /// System/namespace
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Include definition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeDef {
    /// Alias used by references in this library
    pub local_identifier: String,
    /// Identifier of the included library
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

// ============================================================================
// Statements
// ============================================================================

/// Kind of a statement definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    ExpressionDef,
    FunctionDef,
}

impl StatementKind {
    pub fn is_function(self) -> bool {
        self == Self::FunctionDef
    }
}

/// A named statement of a library
#[derive(Debug, Clone)]
pub struct StatementDef {
    pub name: String,
    pub kind: StatementKind,
    pub local_id: Option<LocalId>,
    pub context: Option<String>,
    pub annotation: Vec<Annotation>,
    body: Value,
}

impl StatementDef {
    /// Build a statement from its ELM definition object
    pub fn from_json(def: Value) -> ElmResult<Self> {
        let name = def
            .get("name")
            .and_then(Value::as_str)
            .ok_or_else(|| ElmError::invalid_document("statement definition without a name"))?
            .to_string();

        let kind = match def.get("type").and_then(Value::as_str) {
            Some("FunctionDef") => StatementKind::FunctionDef,
            _ => StatementKind::ExpressionDef,
        };

        let annotation = match def.get("annotation") {
            Some(raw) => Vec::<Annotation>::deserialize(raw).unwrap_or_else(|err| {
                log::debug!("Statement '{}': unreadable annotation ignored: {}", name, err);
                Vec::new()
            }),
            None => Vec::new(),
        };

        Ok(Self {
            local_id: local_id_of(&def),
            context: def.get("context").and_then(Value::as_str).map(str::to_string),
            name,
            kind,
            annotation,
            body: def,
        })
    }

    /// The full definition object, expression included
    pub fn body(&self) -> &Value {
        &self.body
    }
}

/// `localId` of an ELM node; translators emit strings, some tools numbers.
pub fn local_id_of(node: &Value) -> Option<LocalId> {
    node.as_object().and_then(object_local_id)
}

pub(crate) fn object_local_id(node: &Map<String, Value>) -> Option<LocalId> {
    match node.get("localId")? {
        Value::String(id) => Some(LocalId::new(id.as_str())),
        Value::Number(id) => Some(LocalId::new(id.to_string())),
        _ => None,
    }
}

// ============================================================================
// Library
// ============================================================================

/// A compiled ELM library
#[derive(Debug, Clone, Deserialize)]
#[serde(try_from = "Value")]
pub struct ElmLibrary {
    identifier: VersionedIdentifier,
    includes: Vec<IncludeDef>,
    statements: Vec<StatementDef>,
}

impl ElmLibrary {
    /// Load a library from JSON, with or without the `{"library": ...}`
    /// envelope.
    pub fn from_json(document: Value) -> ElmResult<Self> {
        let mut library = match document {
            Value::Object(mut map) => match map.remove("library") {
                Some(inner) => inner,
                None => Value::Object(map),
            },
            _ => return Err(ElmError::invalid_document("expected a JSON object")),
        };

        let identifier = library
            .get_mut("identifier")
            .map(Value::take)
            .ok_or_else(|| ElmError::invalid_document("library without an identifier"))?;
        let identifier: VersionedIdentifier = serde_json::from_value(identifier)?;

        let includes = match library.pointer_mut("/includes/def").map(Value::take) {
            Some(defs) => serde_json::from_value(defs)?,
            None => Vec::new(),
        };

        let statements = match library.pointer_mut("/statements/def").map(Value::take) {
            Some(Value::Array(defs)) => defs
                .into_iter()
                .map(StatementDef::from_json)
                .collect::<ElmResult<Vec<_>>>()?,
            Some(_) => return Err(ElmError::invalid_document("statements.def is not a list")),
            None => Vec::new(),
        };

        Ok(Self {
            identifier,
            includes,
            statements,
        })
    }

    /// Load a library from a JSON string
    pub fn from_json_str(input: &str) -> ElmResult<Self> {
        Self::from_json(serde_json::from_str(input)?)
    }

    /// Load a library from a reader
    pub fn from_reader<R: Read>(mut reader: R) -> ElmResult<Self> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json_str(&content)
    }

    pub fn identifier(&self) -> &VersionedIdentifier {
        &self.identifier
    }

    /// Library name as used in statement references and clause results
    pub fn id(&self) -> &str {
        &self.identifier.id
    }

    pub fn includes(&self) -> &[IncludeDef] {
        &self.includes
    }

    /// Library name behind an include alias
    pub fn include_path(&self, local_identifier: &str) -> Option<&str> {
        self.includes
            .iter()
            .find(|include| include.local_identifier == local_identifier)
            .map(|include| include.path.as_str())
    }

    pub fn statements(&self) -> &[StatementDef] {
        &self.statements
    }

    pub fn find_statement(&self, name: &str) -> Option<&StatementDef> {
        self.statements.iter().find(|statement| statement.name == name)
    }

    /// Look a statement up by name
    pub fn statement(&self, name: &str) -> ElmResult<&StatementDef> {
        self.find_statement(name)
            .ok_or_else(|| ElmError::statement_not_found(self.id(), name))
    }
}

impl TryFrom<Value> for ElmLibrary {
    type Error = ElmError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}
