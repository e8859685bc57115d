use std::collections::HashMap;

/// Error returned when a name is added twice to the same layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlreadyDefined;

/// A stack of name-to-value layers with inner-to-outer lookup
#[derive(Debug, Clone)]
pub struct Scope<T> {
    layers: Vec<HashMap<String, T>>,
}

impl<T> Scope<T> {
    pub fn new() -> Self {
        Self {
            layers: vec![HashMap::new()],
        }
    }

    /// Open a new innermost layer
    pub fn push(&mut self) {
        self.layers.push(HashMap::new());
    }

    /// Drop the innermost layer; the outermost layer always stays
    pub fn pop(&mut self) {
        debug_assert!(self.layers.len() > 1);
        self.layers.pop();
    }

    /// Walk the layers inner to outer and return the first match
    pub fn find(&self, name: &str) -> Option<&T> {
        self.layers.iter().rev().find_map(|layer| layer.get(name))
    }

    /// Bind a name in the innermost layer
    pub fn add(&mut self, name: String, value: T) -> Result<(), AlreadyDefined> {
        let layer = self.layers.last_mut().expect("at least one layer");
        if layer.contains_key(&name) {
            return Err(AlreadyDefined);
        }

        layer.insert(name, value);
        Ok(())
    }
}

impl<T> Default for Scope<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inner_layers_shadow_outer_ones() {
        let mut scope = Scope::new();
        scope.add(String::from("x"), 1).unwrap();

        scope.push();
        scope.add(String::from("x"), 2).unwrap();
        assert_eq!(scope.find("x"), Some(&2));

        scope.pop();
        assert_eq!(scope.find("x"), Some(&1));
    }

    #[test]
    fn redefinition_in_one_layer_fails() {
        let mut scope = Scope::new();
        scope.add(String::from("x"), 1).unwrap();
        assert_eq!(scope.add(String::from("x"), 2), Err(AlreadyDefined));

        // the first binding survives
        assert_eq!(scope.find("x"), Some(&1));
    }

    #[test]
    fn unknown_names_are_not_found() {
        let scope: Scope<u32> = Scope::new();
        assert_eq!(scope.find("y"), None);
    }
}
