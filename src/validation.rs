use std::error::Error as StdError;
use std::marker::PhantomData;

/// Collects errors found while validating a model (see [`Validation`] and
/// [`ContextualValidation`]).
///
/// Most users never implement this trait and call `validate` instead, which collects
/// the errors into a vector.
pub trait ErrorReporter<E: StdError>: Sized {
    fn report<E2: Into<E>>(&mut self, error: E2);

    /// Wrap this reporter so that it accepts a more specific error type `E2`.
    fn wrap<E2: StdError + Into<E>>(&mut self) -> ReporterWrapper<'_, E2, E, Self> {
        ReporterWrapper {
            inner: self,
            _e1: PhantomData,
            _e2: PhantomData,
        }
    }
}

/// An [`ErrorReporter`] that pushes every error into a vector.
pub struct VecReporter<E: StdError> {
    errors: Vec<E>,
}

impl<E: StdError> VecReporter<E> {
    fn into_result(self) -> Result<(), Vec<E>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

/// An [`ErrorReporter`] for errors of a component (e.g. a reaction) that forwards them into
/// the reporter of the enclosing object (e.g. a model), converting them with `Into`.
pub struct ReporterWrapper<'a, E1: StdError + Into<E2>, E2: StdError, W: ErrorReporter<E2>> {
    inner: &'a mut W,
    _e1: PhantomData<E1>,
    _e2: PhantomData<E2>,
}

impl<E1: StdError + Into<E2>, E2: StdError, W: ErrorReporter<E2>> ErrorReporter<E1>
    for ReporterWrapper<'_, E1, E2, W>
{
    fn report<X: Into<E1>>(&mut self, error: X) {
        self.inner.report(error.into());
    }
}

impl<E: StdError> ErrorReporter<E> for VecReporter<E> {
    fn report<X: Into<E>>(&mut self, error: X) {
        self.errors.push(error.into());
    }
}

/// Validation of objects that are only meaningful inside an enclosing `Context`. For example,
/// a reaction can only check that its id is unique and that its metabolites exist once it
/// sees the whole model.
///
/// Validation does not stop at the first problem: all errors are collected.
pub trait ContextualValidation<Context> {
    type Error: StdError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, context: &Context, reporter: &mut R);

    fn validate(&self, context: &Context) -> Result<(), Vec<Self::Error>> {
        let mut reporter = VecReporter { errors: vec![] };
        self.validate_all(context, &mut reporter);
        reporter.into_result()
    }
}

/// Validation of self-contained objects (e.g. a whole model). All errors are collected.
pub trait Validation {
    type Error: StdError;

    fn validate_all<R: ErrorReporter<Self::Error>>(&self, reporter: &mut R);

    fn validate(&self) -> Result<(), Vec<Self::Error>> {
        let mut reporter = VecReporter { errors: vec![] };
        self.validate_all(&mut reporter);
        reporter.into_result()
    }
}
