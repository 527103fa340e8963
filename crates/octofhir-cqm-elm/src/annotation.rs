//! Annotation narrative trees
//!
//! The translator attaches to every statement a narrative of the source
//! text: nested nodes, some tagged with the `r` (local id) of the ELM node
//! they render, leaves carrying text tokens.

use octofhir_cqm_types::LocalId;
use serde::{Deserialize, Serialize};

/// One annotation attached to a statement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub annotation_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s: Option<Narrative>,
}

/// A narrative node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Narrative {
    /// Local id of the rendered ELM node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub s: Vec<Narrative>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub value: Vec<String>,
}

impl Narrative {
    /// First text token, following first children down to a leaf
    pub fn first_token(&self) -> Option<&str> {
        let mut node = self;
        loop {
            if let Some(token) = node.value.first() {
                return Some(token.as_str());
            }
            node = node.s.first()?;
        }
    }
}

/// Find the clause rendering the library qualifier of a cross-library
/// reference.
///
/// For `Global."Normalize Interval"(...)` the narrative node of the
/// reference (`r == ref_id`) starts with a child node of its own whose
/// text is the library name. That child's id is returned. Anything else,
/// including a first child sharing the reference's id, yields `None`.
pub fn find_clause_for_library_reference(
    annotations: &[Annotation],
    ref_id: &LocalId,
    library_name: &str,
) -> Option<LocalId> {
    let mut stack: Vec<&Narrative> = annotations
        .iter()
        .rev()
        .filter_map(|annotation| annotation.s.as_ref())
        .collect();

    while let Some(node) = stack.pop() {
        if node.r.as_deref() == Some(ref_id.as_str()) {
            return library_qualifier(node, ref_id, library_name);
        }
        stack.extend(node.s.iter().rev());
    }
    None
}

fn library_qualifier(node: &Narrative, ref_id: &LocalId, library_name: &str) -> Option<LocalId> {
    let first = node.s.first()?;
    let id = first.r.as_deref()?;
    if id == ref_id.as_str() {
        return None;
    }
    (first.first_token().map(str::trim) == Some(library_name)).then(|| LocalId::new(id))
}
