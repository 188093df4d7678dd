use std::fmt::{Debug, Display};

/// Assertion methods for result types. Useful for testing, improving code
/// readability.
pub trait ResultExt: Sized {
    type Success;
    type Error;

    /// Ensure the result is ok; return the value.
    fn should_succeed(self) -> Self::Success;

    /// Ensure the result is ok, and the value satisfies the given predicate.
    fn should_succeed_and<F>(self, predicate: F) -> Self::Success
    where
        Self::Success: Debug,
        F: FnOnce(&Self::Success) -> bool,
    {
        let success = self.should_succeed();
        assert!(
            predicate(&success),
            "success as expected, but value does not satisfy predicate! value: {success:?}"
        );
        success
    }

    /// Ensure the result is an error.
    fn should_fail(self) -> Self::Error;

    /// Ensure the result is an error whose message contains the given text.
    fn should_fail_with_error<M>(self, msg: M) -> Self::Error
    where
        M: ToString;
}

impl<T, E> ResultExt for Result<T, E>
where
    T: Debug,
    E: Debug + Display,
{
    type Error = E;
    type Success = T;

    fn should_succeed(self) -> T {
        match self {
            Ok(value) => value,
            Err(err) => panic!("expected success, got error: {err}"),
        }
    }

    fn should_fail(self) -> E {
        match self {
            Ok(value) => panic!("expected error, got success: {value:?}"),
            Err(err) => err,
        }
    }

    fn should_fail_with_error<M>(self, msg: M) -> E
    where
        M: ToString,
    {
        let err = self.should_fail();
        let actual = err.to_string();
        let expected = msg.to_string();
        assert!(
            actual.contains(&expected),
            "error message does not contain the expected text!\nexpected: {expected}\nactual: {actual}"
        );
        err
    }
}
