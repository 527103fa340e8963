//! Local-id offsets of proxied constructs
//!
//! Some constructs get a clause in the annotation narrative but no result
//! of their own in engine output. Their clause id is found by a fixed
//! offset from a neighbouring node, which is an assumption about the
//! translator's numbering scheme. The table keeps those offsets in one
//! place.

use serde::{Deserialize, Serialize};

/// A construct whose clause id is derived from a neighbouring local id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProxyConstruct {
    /// Alias of a query source, numbered after the source expression
    AliasBinding,
    /// Scoped property access, numbered before the property node
    ScopeReference,
    /// `as` type specifier, numbered after the cast operand
    TypeCast,
}

/// Offsets applied per [`ProxyConstruct`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OffsetTable {
    pub alias_binding: i64,
    pub scope_reference: i64,
    pub type_cast: i64,
}

impl Default for OffsetTable {
    fn default() -> Self {
        Self {
            alias_binding: 1,
            scope_reference: -1,
            type_cast: -1,
        }
    }
}

impl OffsetTable {
    pub fn offset(&self, construct: ProxyConstruct) -> i64 {
        match construct {
            ProxyConstruct::AliasBinding => self.alias_binding,
            ProxyConstruct::ScopeReference => self.scope_reference,
            ProxyConstruct::TypeCast => self.type_cast,
        }
    }

    /// Replace one offset, builder style
    pub fn with_offset(mut self, construct: ProxyConstruct, delta: i64) -> Self {
        match construct {
            ProxyConstruct::AliasBinding => self.alias_binding = delta,
            ProxyConstruct::ScopeReference => self.scope_reference = delta,
            ProxyConstruct::TypeCast => self.type_cast = delta,
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_override() {
        let table = OffsetTable::default();
        assert_eq!(table.offset(ProxyConstruct::AliasBinding), 1);
        assert_eq!(table.offset(ProxyConstruct::ScopeReference), -1);

        let table = table.with_offset(ProxyConstruct::TypeCast, 2);
        assert_eq!(table.offset(ProxyConstruct::TypeCast), 2);
    }

    #[test]
    fn test_partial_config() {
        let table: OffsetTable = serde_json::from_str(r#"{"aliasBinding": 3}"#).unwrap();
        assert_eq!(table.alias_binding, 3);
        assert_eq!(table.type_cast, -1);
    }
}
