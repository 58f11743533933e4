//! User confirmation before destructive actions.

/// Asks the user a yes/no question.
pub trait Confirm: Send + Sync {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Answers every prompt the same way.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AlwaysAnswer(pub bool);

impl Confirm for AlwaysAnswer {
    fn confirm(&self, _prompt: &str) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn closures_and_fixed_answers_confirm() {
        let picky = |prompt: &str| prompt.contains("vendor");
        assert!(picky.confirm("delete this vendor?"));
        assert!(!picky.confirm("delete this product?"));
        assert!(!AlwaysAnswer(false).confirm("anything"));
    }
}
