use super::ast::VarId;

/// Lexical scope as an append-only binding list. A block saves the current
/// length on entry and truncates back to it on exit, making inner bindings
/// invisible again. Lookup scans newest-first, so an inner binding shadows
/// an outer one of the same name.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    bindings: Vec<(String, VarId)>,
}

/// Saved scope head, returned by [`Scope::enter`].
#[derive(Debug, Clone, Copy)]
pub struct ScopeMark(usize);

impl Scope {
    pub fn enter(&self) -> ScopeMark {
        ScopeMark(self.bindings.len())
    }

    pub fn leave(&mut self, mark: ScopeMark) {
        self.bindings.truncate(mark.0);
    }

    pub fn declare(&mut self, name: impl ToString, id: VarId) {
        self.bindings.push((name.to_string(), id));
    }

    pub fn lookup(&self, name: &str) -> Option<VarId> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| bound == name)
            .map(|&(_, id)| id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shadowing_and_restore() {
        let mut scope = Scope::default();
        scope.declare("x", VarId::Local(0));

        let mark = scope.enter();
        scope.declare("x", VarId::Local(1));
        scope.declare("y", VarId::Local(2));

        assert_eq!(scope.lookup("x"), Some(VarId::Local(1)));
        assert_eq!(scope.lookup("y"), Some(VarId::Local(2)));

        scope.leave(mark);

        assert_eq!(scope.lookup("x"), Some(VarId::Local(0)));
        assert_eq!(scope.lookup("y"), None);
    }

    #[test]
    fn test_lookup_missing() {
        let scope = Scope::default();
        assert_eq!(scope.lookup("nope"), None);
    }
}
