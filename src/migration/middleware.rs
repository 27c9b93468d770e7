//! Middleware chains
//!
//! A [`Stack`] is an ordered list of [`Middleware`] stages in front of a terminal
//! schema primitive. Each stage may run logic before and/or after delegating to
//! the rest of the chain through [`Next`], may skip the delegation, and may
//! inspect or absorb the error the rest of the chain returns.
//!
//! Stacks are built once (see [`IndexPipeline`](super::IndexPipeline)) and run
//! once per migration call.

use super::statements::SchemaStatements;
use crate::LifeError;
use std::fmt;

/// One stage of a chain over environment `E`
pub trait Middleware<E>: Send + Sync {
    /// Stable identifier, used for inspection and logging
    fn name(&self) -> &'static str;

    /// Process `env`; call `next.run(env, caller)` to continue down the chain
    ///
    /// `caller` is the schema the chain runs for. Statements issued through it
    /// enter their own chain from the top.
    fn call(&self, env: &mut E, caller: &dyn SchemaStatements, next: Next<'_, E>) -> Result<(), LifeError>;
}

/// The remainder of a chain
pub struct Next<'a, E> {
    stages: &'a [Box<dyn Middleware<E>>],
    terminal: &'a dyn Fn(&mut E) -> Result<(), LifeError>,
}

impl<'a, E> Next<'a, E> {
    /// Run the remaining stages, then the terminal primitive
    pub fn run(self, env: &mut E, caller: &dyn SchemaStatements) -> Result<(), LifeError> {
        match self.stages.split_first() {
            Some((stage, rest)) => stage.call(
                env,
                caller,
                Next {
                    stages: rest,
                    terminal: self.terminal,
                },
            ),
            None => (self.terminal)(env),
        }
    }
}

/// Ordered chain of stages; the first stage runs outermost
pub struct Stack<E> {
    stages: Vec<Box<dyn Middleware<E>>>,
}

impl<E> Stack<E> {
    pub fn new() -> Self {
        Self { stages: Vec::new() }
    }

    /// Insert `stage` in front of every existing stage
    pub fn prepend(&mut self, stage: impl Middleware<E> + 'static) -> &mut Self {
        self.stages.insert(0, Box::new(stage));
        self
    }

    /// Insert `stage` after every existing stage, closest to the primitive
    pub fn append(&mut self, stage: impl Middleware<E> + 'static) -> &mut Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Stage names, outermost first
    pub fn names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run the chain for `env`, ending in `terminal`
    pub fn run(
        &self,
        env: &mut E,
        caller: &dyn SchemaStatements,
        terminal: &dyn Fn(&mut E) -> Result<(), LifeError>,
    ) -> Result<(), LifeError> {
        Next {
            stages: &self.stages,
            terminal,
        }
        .run(env, caller)
    }
}

impl<E> Default for Stack<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Stack<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::IndexDefinition;
    use crate::options::OptionMap;
    use std::sync::Mutex;

    struct NoSchema;

    impl SchemaStatements for NoSchema {
        fn add_column(&self, _: &str, _: &str, _: &str, _: &OptionMap) -> Result<(), LifeError> {
            Ok(())
        }

        fn add_index(&self, _: &str, _: &[String], _: &OptionMap) -> Result<(), LifeError> {
            Ok(())
        }

        fn indexes(&self, _: &str) -> Result<Vec<IndexDefinition>, LifeError> {
            Ok(Vec::new())
        }
    }

    struct Tag(&'static str);

    impl Middleware<Vec<String>> for Tag {
        fn name(&self) -> &'static str {
            self.0
        }

        fn call(
            &self,
            env: &mut Vec<String>,
            caller: &dyn SchemaStatements,
            next: Next<'_, Vec<String>>,
        ) -> Result<(), LifeError> {
            env.push(format!("before {}", self.0));
            next.run(env, caller)?;
            env.push(format!("after {}", self.0));
            Ok(())
        }
    }

    struct ShortCircuit;

    impl Middleware<Vec<String>> for ShortCircuit {
        fn name(&self) -> &'static str {
            "short_circuit"
        }

        fn call(&self, env: &mut Vec<String>, _: &dyn SchemaStatements, _: Next<'_, Vec<String>>) -> Result<(), LifeError> {
            env.push("stopped".to_string());
            Ok(())
        }
    }

    #[test]
    fn test_prepend_and_append_order() {
        let mut stack = Stack::new();
        stack.append(Tag("b")).prepend(Tag("a")).append(Tag("c"));
        assert_eq!(stack.names(), vec!["a", "b", "c"]);

        let mut env = Vec::new();
        stack
            .run(&mut env, &NoSchema, &|env: &mut Vec<String>| {
                env.push("terminal".to_string());
                Ok(())
            })
            .unwrap();

        assert_eq!(
            env,
            vec!["before a", "before b", "before c", "terminal", "after c", "after b", "after a"]
        );
    }

    #[test]
    fn test_empty_stack_runs_terminal() {
        let stack: Stack<Vec<String>> = Stack::new();
        let calls = Mutex::new(0);
        let mut env = Vec::new();
        stack
            .run(&mut env, &NoSchema, &|_: &mut Vec<String>| {
                *calls.lock().unwrap() += 1;
                Ok(())
            })
            .unwrap();
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[test]
    fn test_stage_can_skip_the_rest_of_the_chain() {
        let mut stack = Stack::new();
        stack.append(ShortCircuit).append(Tag("never"));

        let mut env = Vec::new();
        stack
            .run(&mut env, &NoSchema, &|_: &mut Vec<String>| {
                Err(LifeError::Other("terminal must not run".to_string()))
            })
            .unwrap();
        assert_eq!(env, vec!["stopped"]);
    }

    #[test]
    fn test_terminal_error_propagates_through_stages() {
        let mut stack = Stack::new();
        stack.append(Tag("a"));

        let mut env = Vec::new();
        let err = stack
            .run(&mut env, &NoSchema, &|_: &mut Vec<String>| {
                Err(LifeError::QueryError("boom".to_string()))
            })
            .unwrap_err();
        assert!(matches!(err, LifeError::QueryError(ref m) if m == "boom"));
        assert_eq!(env, vec!["before a"]);
    }
}
