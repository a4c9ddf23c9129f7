//! XML namespace handling
//!
//! Qualified names and the per-parse namespace scope stack. Prefix mappings
//! are scoped to a single parse invocation: a scope is pushed for every
//! element open and popped on the matching close, so declarations shadow
//! outer ones exactly as in the source document.

use std::fmt;

use crate::error::{Error, Result};

/// Qualified name (QName) - combination of namespace and local name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<String>,
    /// Local name
    pub local_name: String,
}

impl QName {
    /// Create a new QName
    pub fn new(namespace: Option<impl Into<String>>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()),
            local_name: local_name.into(),
        }
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            local_name: local_name.into(),
        }
    }

    /// Get the local name
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Get the namespace URI
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// Split a prefixed name into prefix and local name
pub fn split_prefixed(name: &str) -> (Option<&str>, &str) {
    if let Some((prefix, local)) = name.split_once(':') {
        (Some(prefix), local)
    } else {
        (None, name)
    }
}

/// One namespace declaration inside a scope
#[derive(Debug, Clone)]
struct Declaration {
    /// Prefix (None for the default namespace)
    prefix: Option<String>,
    /// Namespace URI
    namespace: String,
}

/// Per-parse stack of namespace scopes
///
/// One scope is pushed per element open (possibly empty) and popped on the
/// matching close. Lookups walk the stack top-down so inner declarations
/// shadow outer ones.
#[derive(Debug, Default)]
pub struct NamespaceScopes {
    scopes: Vec<Vec<Declaration>>,
}

impl NamespaceScopes {
    /// Create an empty scope stack
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    /// Push a new scope with the given (prefix, namespace) declarations.
    /// A `None` prefix declares the default namespace.
    pub fn push_scope(&mut self, declarations: Vec<(Option<String>, String)>) {
        self.scopes.push(
            declarations
                .into_iter()
                .map(|(prefix, namespace)| Declaration { prefix, namespace })
                .collect(),
        );
    }

    /// Pop the innermost scope
    pub fn pop_scope(&mut self) {
        self.scopes.pop();
    }

    /// Current nesting depth
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Look up the namespace bound to a prefix (innermost wins)
    pub fn lookup(&self, prefix: &str) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for decl in scope.iter().rev() {
                if decl.prefix.as_deref() == Some(prefix) {
                    return Some(&decl.namespace);
                }
            }
        }
        None
    }

    /// Look up the innermost default namespace
    pub fn default_namespace(&self) -> Option<&str> {
        for scope in self.scopes.iter().rev() {
            for decl in scope.iter().rev() {
                if decl.prefix.is_none() {
                    return Some(&decl.namespace);
                }
            }
        }
        None
    }

    /// Resolve an element name. Unprefixed element names take the default
    /// namespace when one is in scope.
    pub fn resolve_element(&self, name: &str) -> Result<QName> {
        match split_prefixed(name) {
            (Some(prefix), local) => {
                let namespace = self
                    .lookup(prefix)
                    .ok_or_else(|| Error::Namespace(format!("unknown prefix: {}", prefix)))?;
                Ok(QName::namespaced(namespace, local))
            }
            (None, local) => Ok(QName::new(self.default_namespace(), local)),
        }
    }

    /// Resolve an attribute name. Unprefixed attribute names never take the
    /// default namespace.
    pub fn resolve_attribute(&self, name: &str) -> Result<QName> {
        match split_prefixed(name) {
            (Some(prefix), local) => {
                let namespace = self
                    .lookup(prefix)
                    .ok_or_else(|| Error::Namespace(format!("unknown prefix: {}", prefix)))?;
                Ok(QName::namespaced(namespace, local))
            }
            (None, local) => Ok(QName::local(local)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qname_creation() {
        let qname = QName::namespaced("http://example.com", "feature");
        assert_eq!(qname.namespace(), Some("http://example.com"));
        assert_eq!(qname.local_name(), "feature");
    }

    #[test]
    fn test_qname_display() {
        let qname = QName::namespaced("http://example.com", "feature");
        assert_eq!(qname.to_string(), "{http://example.com}feature");

        let qname_local = QName::local("feature");
        assert_eq!(qname_local.to_string(), "feature");
    }

    #[test]
    fn test_split_prefixed() {
        assert_eq!(split_prefixed("pos"), (None, "pos"));
        assert_eq!(split_prefixed("gml:pos"), (Some("gml"), "pos"));
    }

    #[test]
    fn test_scope_resolution() {
        let mut scopes = NamespaceScopes::new();
        scopes.push_scope(vec![
            (Some("gml".to_string()), "http://www.opengis.net/gml/3.2".to_string()),
            (None, "http://example.com/app".to_string()),
        ]);

        let qname = scopes.resolve_element("gml:Point").unwrap();
        assert_eq!(qname.namespace(), Some("http://www.opengis.net/gml/3.2"));
        assert_eq!(qname.local_name(), "Point");

        // Unprefixed elements take the default namespace
        let qname = scopes.resolve_element("feature").unwrap();
        assert_eq!(qname.namespace(), Some("http://example.com/app"));

        // Unprefixed attributes do not
        let qname = scopes.resolve_attribute("srsName").unwrap();
        assert_eq!(qname.namespace(), None);
    }

    #[test]
    fn test_scope_shadowing() {
        let mut scopes = NamespaceScopes::new();
        scopes.push_scope(vec![(Some("p".to_string()), "http://outer".to_string())]);
        scopes.push_scope(vec![(Some("p".to_string()), "http://inner".to_string())]);

        assert_eq!(scopes.lookup("p"), Some("http://inner"));

        scopes.pop_scope();
        assert_eq!(scopes.lookup("p"), Some("http://outer"));
    }

    #[test]
    fn test_unknown_prefix() {
        let scopes = NamespaceScopes::new();
        assert!(scopes.resolve_element("gml:Point").is_err());
    }
}
