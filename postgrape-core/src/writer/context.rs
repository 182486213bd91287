use crate::Value;
use std::{
    mem,
    ops::{Deref, DerefMut},
};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fragment {
    #[default]
    None,
    SqlCall,
    SqlInsertInto,
    SqlInsertIntoValues,
    SqlReturning,
    SqlSearchRank,
    SqlSelect,
    SqlSelectOrderBy,
    SqlSelectWhere,
    SqlUpdateSet,
}

/// State shared while writing one statement.
///
/// In parameterized mode values are collected in `parameters` and referenced as `$n`, otherwise
/// they are inlined as literals.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Context {
    pub fragment: Fragment,
    pub parameterized: bool,
    pub parameters: Vec<Value>,
}

impl Context {
    pub fn new(fragment: Fragment, parameterized: bool) -> Self {
        Self {
            fragment,
            parameterized,
            parameters: Vec::new(),
        }
    }

    pub fn inline() -> Self {
        Self::new(Fragment::None, false)
    }

    pub fn parameterized() -> Self {
        Self::new(Fragment::None, true)
    }

    /// Append a parameter and return its 1 based position.
    pub fn push_parameter(&mut self, value: Value) -> usize {
        self.parameters.push(value);
        self.parameters.len()
    }

    /// Change the fragment until the returned guard is dropped.
    pub fn switch_fragment<'s>(&'s mut self, fragment: Fragment) -> ContextUpdater<'s> {
        let previous = mem::replace(&mut self.fragment, fragment);
        ContextUpdater {
            context: self,
            previous,
        }
    }
}

pub struct ContextUpdater<'a> {
    context: &'a mut Context,
    previous: Fragment,
}

impl<'a> Deref for ContextUpdater<'a> {
    type Target = Context;
    fn deref(&self) -> &Self::Target {
        self.context
    }
}

impl<'a> DerefMut for ContextUpdater<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.context
    }
}

impl<'a> Drop for ContextUpdater<'a> {
    fn drop(&mut self) {
        self.context.fragment = self.previous;
    }
}
