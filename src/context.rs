//! Layered template context.
//!
//! A [`Context`] is a stack of variable maps. Lookups search from the top of
//! the stack down, so values pushed later shadow earlier ones. A fresh context
//! holds exactly one layer, the builtins, which can never be popped.

use serde_json::{Map, Value};

type Layer = Map<String, Value>;

#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    layers: Vec<Layer>,
}

impl Context {
    pub fn new() -> Self {
        let mut builtins = Layer::new();
        builtins.insert("True".into(), Value::Bool(true));
        builtins.insert("False".into(), Value::Bool(false));
        builtins.insert("None".into(), Value::Null);
        Self { layers: vec![builtins] }
    }

    /// A context with the builtins plus one layer holding `vars`.
    pub fn with_vars(vars: Layer) -> Self {
        let mut context = Self::new();
        context.push(vars);
        context
    }

    pub fn push(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Removes the top layer. The builtins layer stays; `None` is returned then.
    pub fn pop(&mut self) -> Option<Layer> {
        if self.layers.len() > 1 {
            self.layers.pop()
        } else {
            None
        }
    }

    /// Runs `f` with `vars` pushed as a temporary top layer.
    ///
    /// No layer is pushed when `vars` is `None` or empty. Whatever `f` returns,
    /// the context is back to its previous layers afterwards.
    pub fn scoped<R>(
        &mut self,
        vars: Option<&Layer>,
        f: impl FnOnce(&Context) -> R,
    ) -> R {
        match vars.filter(|vars| !vars.is_empty()) {
            Some(vars) => {
                self.push(vars.clone());
                let result = f(self);
                self.pop();
                result
            }
            None => f(self),
        }
    }

    /// Number of layers, builtins included.
    pub fn depth(&self) -> usize {
        self.layers.len()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.layers.iter().rev().find_map(|layer| layer.get(key))
    }

    /// Sets `key` in the top layer.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        // layers is never empty
        if let Some(top) = self.layers.last_mut() {
            top.insert(key.into(), value);
        }
    }

    /// Merged view of every layer, upper layers winning.
    pub fn flatten(&self) -> Value {
        let mut merged = Layer::new();
        for layer in &self.layers {
            for (key, value) in layer {
                merged.insert(key.clone(), value.clone());
            }
        }
        Value::Object(merged)
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Layer> for Context {
    fn from(vars: Layer) -> Self {
        Self::with_vars(vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn layer(value: Value) -> Layer {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn new_context_has_only_builtins() {
        let context = Context::new();
        assert_eq!(context.depth(), 1);
        assert_eq!(context.get("True"), Some(&json!(true)));
        assert_eq!(context.get("obj"), None);
    }

    #[test]
    fn upper_layers_shadow_lower_ones() {
        let mut context = Context::with_vars(layer(json!({ "obj": "before", "x": 1 })));
        context.push(layer(json!({ "obj": "after" })));
        assert_eq!(context.get("obj"), Some(&json!("after")));
        assert_eq!(context.flatten()["obj"], json!("after"));
        assert_eq!(context.flatten()["x"], json!(1));

        context.pop();
        assert_eq!(context.get("obj"), Some(&json!("before")));
    }

    #[test]
    fn builtins_layer_is_never_popped() {
        let mut context = Context::new();
        assert!(context.pop().is_none());
        assert_eq!(context.depth(), 1);
    }

    #[test]
    fn insert_writes_top_layer() {
        let mut context = Context::with_vars(layer(json!({ "a": 1 })));
        context.push(Layer::new());
        context.insert("a", json!(2));
        assert_eq!(context.get("a"), Some(&json!(2)));
        context.pop();
        assert_eq!(context.get("a"), Some(&json!(1)));
    }

    #[test]
    fn scoped_pushes_only_non_empty_vars() {
        let mut context = Context::with_vars(layer(json!({ "obj": "before" })));

        let seen = context.scoped(None, |inner| inner.depth());
        assert_eq!(seen, 2);
        let seen = context.scoped(Some(&Layer::new()), |inner| inner.depth());
        assert_eq!(seen, 2);

        let vars = layer(json!({ "obj": "after" }));
        let (depth, obj) =
            context.scoped(Some(&vars), |inner| (inner.depth(), inner.get("obj").cloned()));
        assert_eq!(depth, 3);
        assert_eq!(obj, Some(json!("after")));

        assert_eq!(context.depth(), 2);
        assert_eq!(context.get("obj"), Some(&json!("before")));
    }
}
