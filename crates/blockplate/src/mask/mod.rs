//! Masks and processors.
//!
//! A *mask* is a named value transform applied to a single placeholder at
//! substitution time. Placeholders chain masks with pipes and they run left
//! to right:
//!
//! ```text
//! {{{price|double|addOne}}}   // addOne(double(price))
//! {{title|upper}}             // upper(escape(title))
//! ```
//!
//! Masks are registered once per name; registering the same name again
//! replaces the previous mask. Extra parameters can be bound at registration
//! time and are passed to every invocation after the value.
//!
//! A placeholder naming an unregistered mask renders its value unchanged.
//!
//! A *processor* is a whole-output transform. Processors run once, after all
//! substitution, stripping and quote decoding, in registration order.

pub mod builtin;

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use blockplate_parser::is_identifier;
use log::debug;

use crate::error::{Error, Result};
use crate::value::Value;

/// Signature of a mask: the value plus the parameters bound at registration.
pub type MaskFn = dyn Fn(Value, &[Value]) -> Value;

/// Signature of a processor.
pub type ProcessorFn = dyn Fn(String) -> String;

struct Mask {
    func: Rc<MaskFn>,
    params: Vec<Value>,
}

/// Named masks, one per name.
#[derive(Default)]
pub(crate) struct MaskRegistry {
    masks: HashMap<String, Mask>,
}

impl MaskRegistry {
    /// Registers `func` under `name`, replacing any previous mask.
    ///
    /// Fails with `InvalidCallback` when `name` could never be referenced
    /// from a placeholder.
    pub(crate) fn register(
        &mut self,
        name: &str,
        func: Rc<MaskFn>,
        params: Vec<Value>,
    ) -> Result<()> {
        if !is_identifier(name) {
            return Err(Error::InvalidCallback {
                name: name.to_string(),
                reason: "mask names must be identifiers to be usable in placeholders",
            });
        }

        let replaced = self
            .masks
            .insert(name.to_string(), Mask { func, params })
            .is_some();
        if replaced {
            debug!("mask \"{}\" re-registered, previous mask replaced", name);
        } else {
            debug!("mask \"{}\" registered", name);
        }
        Ok(())
    }

    /// Applies the named mask; unknown names pass the value through.
    pub(crate) fn apply(&self, name: &str, value: Value) -> Value {
        match self.masks.get(name) {
            Some(mask) => (mask.func)(value, &mask.params),
            None => value,
        }
    }

    /// Applies masks in chain order.
    pub(crate) fn apply_chain<'a, I>(&self, chain: I, value: Value) -> Value
    where
        I: IntoIterator<Item = &'a str>,
    {
        chain
            .into_iter()
            .fold(value, |current, name| self.apply(name, current))
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.masks.contains_key(name)
    }

    pub(crate) fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.masks.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl fmt::Debug for MaskRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MaskRegistry")
            .field("masks", &self.names())
            .finish()
    }
}

/// Ordered, append-only list of output processors.
#[derive(Default)]
pub(crate) struct Processors {
    chain: Vec<Box<ProcessorFn>>,
}

impl Processors {
    pub(crate) fn push(&mut self, processor: Box<ProcessorFn>) {
        self.chain.push(processor);
        debug!("processor #{} registered", self.chain.len());
    }

    /// Folds the output through every processor in registration order.
    pub(crate) fn run(&self, output: String) -> String {
        self.chain
            .iter()
            .fold(output, |current, processor| processor(current))
    }

    pub(crate) fn len(&self) -> usize {
        self.chain.len()
    }
}

impl fmt::Debug for Processors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Processors")
            .field("len", &self.chain.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn double(v: Value, _: &[Value]) -> Value {
        Value::Int(v.as_i64().unwrap_or(0) * 2)
    }

    fn add_one(v: Value, _: &[Value]) -> Value {
        Value::Int(v.as_i64().unwrap_or(0) + 1)
    }

    #[test]
    fn test_chain_runs_left_to_right() {
        let mut masks = MaskRegistry::default();
        masks.register("double", Rc::new(double), Vec::new()).unwrap();
        masks.register("addOne", Rc::new(add_one), Vec::new()).unwrap();

        assert_eq!(masks.apply_chain(["double", "addOne"], Value::Int(3)), Value::Int(7));
        assert_eq!(masks.apply_chain(["addOne", "double"], Value::Int(3)), Value::Int(8));
    }

    #[test]
    fn test_unknown_mask_passes_through() {
        let masks = MaskRegistry::default();
        assert_eq!(masks.apply("nope", Value::from("x")), Value::from("x"));
    }

    #[test]
    fn test_bound_params_follow_value() {
        let mut masks = MaskRegistry::default();
        masks
            .register(
                "wrap",
                Rc::new(|v: Value, params: &[Value]| {
                    let open = params.first().map(Value::to_string).unwrap_or_default();
                    let close = params.get(1).map(Value::to_string).unwrap_or_default();
                    Value::String(format!("{}{}{}", open, v, close))
                }),
                vec![Value::from("["), Value::from("]")],
            )
            .unwrap();
        assert_eq!(masks.apply("wrap", Value::from("x")), Value::from("[x]"));
    }

    #[test]
    fn test_last_registration_wins() {
        let mut masks = MaskRegistry::default();
        masks.register("m", Rc::new(double), Vec::new()).unwrap();
        masks.register("m", Rc::new(add_one), Vec::new()).unwrap();
        assert_eq!(masks.apply("m", Value::Int(3)), Value::Int(4));
        assert_eq!(masks.names(), vec!["m"]);
    }

    #[test]
    fn test_invalid_name_rejected() {
        let mut masks = MaskRegistry::default();
        for name in ["", "two words", "pipe|d", "9lives"] {
            assert!(matches!(
                masks.register(name, Rc::new(double), Vec::new()),
                Err(Error::InvalidCallback { .. })
            ));
        }
        assert!(!masks.contains(""));
    }

    #[test]
    fn test_processors_run_in_order() {
        let mut processors = Processors::default();
        processors.push(Box::new(|s: String| format!("{}a", s)));
        processors.push(Box::new(|s: String| format!("{}b", s)));
        processors.push(Box::new(|s: String| s.to_uppercase()));
        assert_eq!(processors.run("x".to_string()), "XAB");
        assert_eq!(processors.len(), 3);
    }

    #[test]
    fn test_no_processors_is_identity() {
        let processors = Processors::default();
        assert_eq!(processors.run("same".to_string()), "same");
    }
}
