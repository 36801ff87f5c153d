//! Argument matchers for expectations.
//!
//! A [`Matcher`] is built against the parameter's concrete type and erased
//! to an [`ArgMatcher`] when the expectation's parameter list is
//! assembled. Matching happens over `&dyn Any`, so a matcher built for
//! one type simply rejects values of another.

use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

type AcceptFn = Box<dyn Fn(&dyn Any) -> bool + Send + Sync>;

/// Typed matcher for a single expected argument.
pub struct Matcher<T> {
    description: String,
    accept: AcceptFn,
    marker: PhantomData<fn(T)>,
}

impl<T: Any> Matcher<T> {
    fn build(description: impl Into<String>, accept: AcceptFn) -> Self {
        Matcher {
            description: description.into(),
            accept,
            marker: PhantomData,
        }
    }

    /// Accepts every value of the parameter type.
    pub fn any() -> Self {
        Matcher::build("<any>", Box::new(|_| true))
    }

    /// Accepts values the predicate approves of.
    pub fn matching(is_matching: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Matcher::build(
            "<matching>",
            Box::new(move |value| value.downcast_ref::<T>().map_or(false, &is_matching)),
        )
    }

    /// Equality against a value of a different concrete type. Used where
    /// the declared parameter type erases the value the caller passes.
    pub fn casted<O>(expected: O) -> Self
    where
        O: PartialEq + fmt::Debug + Any + Send + Sync,
    {
        Matcher::build(
            format!("{:?}", expected),
            Box::new(move |value| value.downcast_ref::<O>() == Some(&expected)),
        )
    }

    /// Drops the type parameter; from here on only `&dyn Any` matching.
    pub fn erased(self) -> ArgMatcher {
        ArgMatcher {
            description: self.description,
            accept: self.accept,
        }
    }
}

impl<T: PartialEq + fmt::Debug + Any + Send + Sync> Matcher<T> {
    /// Equality against an expected value.
    pub fn value(expected: T) -> Self {
        Matcher::build(
            format!("{:?}", expected),
            Box::new(move |value| value.downcast_ref::<T>() == Some(&expected)),
        )
    }
}

impl<T: Any> Matcher<Option<T>> {
    /// Accepts `None`.
    pub fn nil() -> Self {
        Matcher::build(
            "nil",
            Box::new(|value| value.downcast_ref::<Option<T>>().map_or(false, Option::is_none)),
        )
    }

    /// Accepts any `Some`.
    pub fn not_nil() -> Self {
        Matcher::build(
            "<non-nil>",
            Box::new(|value| value.downcast_ref::<Option<T>>().map_or(false, Option::is_some)),
        )
    }
}

impl<T> fmt::Debug for Matcher<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Matcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// Type-erased matcher as stored in an expectation's parameter list.
pub struct ArgMatcher {
    description: String,
    accept: AcceptFn,
}

impl ArgMatcher {
    pub fn new(
        description: impl Into<String>,
        accept: impl Fn(&dyn Any) -> bool + Send + Sync + 'static,
    ) -> Self {
        ArgMatcher {
            description: description.into(),
            accept: Box::new(accept),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn accepts(&self, value: &dyn Any) -> bool {
        (self.accept)(value)
    }
}

impl fmt::Debug for ArgMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArgMatcher")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_any_accepts_everything() {
        let matcher = Matcher::<i32>::any().erased();
        assert!(matcher.accepts(&7));
        assert!(matcher.accepts(&"other type"));
        assert_eq!(matcher.description(), "<any>");
    }

    #[test]
    fn test_value_matches_equal_values_only() {
        let matcher = Matcher::value(42).erased();
        assert!(matcher.accepts(&42));
        assert!(!matcher.accepts(&41));
        assert_eq!(matcher.description(), "42");
    }

    #[test]
    fn test_value_rejects_other_types() {
        let matcher = Matcher::value(42i32).erased();
        assert!(!matcher.accepts(&42i64));
    }

    #[test]
    fn test_string_values_are_quoted_in_description() {
        let matcher = Matcher::value(String::from("label")).erased();
        assert_eq!(matcher.description(), "\"label\"");
        assert!(matcher.accepts(&String::from("label")));
        assert!(!matcher.accepts(&String::from("other")));
    }

    #[test]
    fn test_matching_applies_predicate() {
        let matcher = Matcher::<i32>::matching(|value| *value > 10).erased();
        assert!(matcher.accepts(&11));
        assert!(!matcher.accepts(&10));
        assert_eq!(matcher.description(), "<matching>");
    }

    #[test]
    fn test_casted_matches_the_other_type() {
        let matcher = Matcher::<Box<dyn Any + Send>>::casted(5u8).erased();
        assert!(matcher.accepts(&5u8));
        assert!(!matcher.accepts(&5i32));
        assert_eq!(matcher.description(), "5");
    }

    #[test]
    fn test_nil_and_not_nil() {
        let nil = Matcher::<Option<i32>>::nil().erased();
        let not_nil = Matcher::<Option<i32>>::not_nil().erased();
        let none: Option<i32> = None;
        let some: Option<i32> = Some(3);
        assert!(nil.accepts(&none));
        assert!(!nil.accepts(&some));
        assert!(not_nil.accepts(&some));
        assert!(!not_nil.accepts(&none));
        assert_eq!(nil.description(), "nil");
        assert_eq!(not_nil.description(), "<non-nil>");
    }
}
