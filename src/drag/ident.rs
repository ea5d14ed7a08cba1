use crate::domain::entity::EntityKind;
use std::{fmt, str::FromStr};

/// Structured composite identifier carried by drag events.
///
/// Identifies an entity plus enough ancestor context (nearest first)
/// to disambiguate it when the same record could appear under
/// different parents in a multi-board setting. The wire form is the
/// colon-delimited `"<kind>:<entityId>[:<ancestorId>]*"` grammar, but
/// within the crate the fields are constructed and destructured
/// explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragRef {
    pub kind: EntityKind,
    pub id: String,
    pub ancestors: Vec<String>,
}

impl DragRef {
    pub fn new(kind: EntityKind, id: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            ancestors: Vec::new(),
        }
    }

    pub fn with_ancestors(mut self, ancestors: Vec<String>) -> Self {
        self.ancestors = ancestors;
        self
    }
}

impl fmt::Display for DragRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)?;
        for ancestor in &self.ancestors {
            write!(f, ":{}", ancestor)?;
        }
        Ok(())
    }
}

impl FromStr for DragRef {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split(':');

        let kind = tokens
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("Empty drag identifier '{}'", s))?
            .parse::<EntityKind>()?;

        let id = tokens
            .next()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| format!("Drag identifier '{}' is missing an entity id", s))?
            .to_string();

        let ancestors: Vec<String> = tokens.map(str::to_string).collect();
        if ancestors.iter().any(String::is_empty) {
            return Err(format!("Drag identifier '{}' has an empty ancestor token", s));
        }

        Ok(Self { kind, id, ancestors })
    }
}
