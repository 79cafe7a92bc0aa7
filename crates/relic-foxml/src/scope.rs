/// Namespace declarations in scope at the decoder's current position.
#[derive(Debug, Default)]
pub(crate) struct NamespaceScope {
    frames: Vec<Vec<(String, String)>>,
}

impl NamespaceScope {
    pub(crate) fn push(&mut self, declarations: &[(String, String)]) {
        self.frames.push(declarations.to_vec());
    }

    pub(crate) fn pop(&mut self) {
        self.frames.pop();
    }

    /// Effective bindings, innermost declaration winning, sorted by prefix.
    pub(crate) fn bindings(&self) -> Vec<(String, String)> {
        let mut out: Vec<(String, String)> = Vec::new();
        for frame in self.frames.iter().rev() {
            for (prefix, uri) in frame {
                if !out.iter().any(|(p, _)| p == prefix) {
                    out.push((prefix.clone(), uri.clone()));
                }
            }
        }
        out.sort();
        out
    }
}
