use crate::{
    class::{Class, Instance},
    exception::AttrResult,
    hook::{Hook, HookKind},
    resolver::Resolver,
    value::Value,
};

/// A class-level constant shared by all instances.
///
/// Non-data: an instance that assigns the same name stores its own value, which
/// then shadows the constant for that instance only.
#[derive(Debug, Clone, PartialEq)]
pub struct PlainValue {
    value: Value,
}

impl PlainValue {
    #[must_use]
    pub fn new(value: impl Into<Value>) -> Self {
        Self { value: value.into() }
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

impl Hook for PlainValue {
    fn kind(&self) -> HookKind {
        HookKind::Plain
    }

    fn get(&self, _cx: &mut Resolver<'_>, _instance: &mut Instance, _name: &str) -> AttrResult<Value> {
        Ok(self.value.clone())
    }

    fn get_class(&self, _owner: &Class, _name: &str) -> Option<Value> {
        Some(self.value.clone())
    }
}
