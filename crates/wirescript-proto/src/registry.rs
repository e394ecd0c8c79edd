//! Message-type registry.
//!
//! The registry maps message names and numeric codes to descriptors. It is
//! built once, then shared read-only across the engine: runners borrow it and
//! query it without locking, and no mutation path exists after construction.

use std::collections::HashMap;

use crate::{
    errors::{Result, WireError},
    field::{FieldDef, FieldKind},
    message::MessageDescriptor,
};

/// Read-only lookup service for message descriptors.
#[derive(Debug, Clone, Default)]
pub struct MessageRegistry {
    by_name: HashMap<String, MessageDescriptor>,
    code_to_name: HashMap<u16, String>,
}

impl MessageRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the standard setup and control messages.
    ///
    /// Mirrors the protocol's base namespace: `warning`, `init`, `error`,
    /// `ping`, `pong`. The liveness pair is what the simulated peer's
    /// auto-response logic keys on.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        let descriptors = [
            MessageDescriptor::new(
                "warning",
                1,
                vec![FieldDef::new("data", FieldKind::Bytes)],
            ),
            MessageDescriptor::new(
                "init",
                16,
                vec![
                    FieldDef::new("globalfeatures", FieldKind::Bytes),
                    FieldDef::new("features", FieldKind::Bytes),
                ],
            ),
            MessageDescriptor::new(
                "error",
                17,
                vec![FieldDef::new("data", FieldKind::Bytes)],
            ),
            MessageDescriptor::new(
                "ping",
                18,
                vec![
                    FieldDef::new("num_pong_bytes", FieldKind::U16),
                    FieldDef::new("byteslen", FieldKind::U16),
                    FieldDef::new("ignored", FieldKind::Rest),
                ],
            ),
            MessageDescriptor::new(
                "pong",
                19,
                vec![
                    FieldDef::new("byteslen", FieldKind::U16),
                    FieldDef::new("ignored", FieldKind::Rest),
                ],
            ),
        ];

        for desc in descriptors {
            // The standard set is statically well-formed.
            registry.code_to_name.insert(desc.code, desc.name.clone());
            registry.by_name.insert(desc.name.clone(), desc);
        }
        registry
    }

    /// Register a descriptor.
    ///
    /// # Errors
    ///
    /// [`WireError::DuplicateMessage`] if the name or code is taken,
    /// [`WireError::RestNotLast`] if a `Rest` field is not final.
    pub fn register(&mut self, desc: MessageDescriptor) -> Result<()> {
        if let Some((pos, field)) = desc
            .fields
            .iter()
            .enumerate()
            .find(|(_, f)| f.kind == FieldKind::Rest)
        {
            if pos + 1 != desc.fields.len() {
                return Err(WireError::RestNotLast {
                    message: desc.name.clone(),
                    field: field.name.clone(),
                });
            }
        }

        if self.by_name.contains_key(&desc.name) || self.code_to_name.contains_key(&desc.code) {
            return Err(WireError::DuplicateMessage { name: desc.name, code: desc.code });
        }

        self.code_to_name.insert(desc.code, desc.name.clone());
        self.by_name.insert(desc.name.clone(), desc);
        Ok(())
    }

    /// Look up a descriptor by message name.
    pub fn lookup(&self, name: &str) -> Option<&MessageDescriptor> {
        self.by_name.get(name)
    }

    /// Look up a descriptor by numeric type code.
    pub fn lookup_code(&self, code: u16) -> Option<&MessageDescriptor> {
        self.code_to_name.get(&code).and_then(|name| self.by_name.get(name))
    }

    /// Number of registered message types.
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    /// True if no message types are registered.
    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
