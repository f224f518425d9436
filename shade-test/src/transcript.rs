//! Scripted request sequences for checking settlement services.
//!
//! A [`Transcript`] is a list of steps: a request, and either the response
//! it must produce or a [`TransError`] describing the rejection it must
//! produce. Settlement services reject actions with boxed typed errors, so
//! expected errors are matched by downcasting.

use std::{error::Error as StdError, fmt, fmt::Debug, sync::Arc};

use color_eyre::{
    eyre::{eyre, Report, WrapErr},
    section::{Section, SectionExt},
};
use tower::{Service, ServiceExt};

type Error = Box<dyn StdError + Send + Sync + 'static>;

type Matcher = Arc<dyn Fn(&Error) -> bool + Send + Sync>;

/// The error a transcript step expects.
#[derive(Clone)]
pub enum TransError {
    /// Any error is accepted.
    Any,

    /// The error must match.
    Matches {
        /// What the step expects, for failure reports.
        expected: &'static str,
        /// Returns `true` if the error is the expected one.
        matcher: Matcher,
    },
}

impl Debug for TransError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransError::Any => f.write_str("Any"),
            TransError::Matches { expected, .. } => {
                f.debug_tuple("Matches").field(expected).finish()
            }
        }
    }
}

impl TransError {
    /// Expect an error of type `E`.
    pub fn of_type<E>() -> Self
    where
        E: StdError + 'static,
    {
        Self::downcast::<E, _>(std::any::type_name::<E>(), |_| true)
    }

    /// Expect an error of type `E` that satisfies `predicate`.
    ///
    /// `expected` describes the error in failure reports.
    pub fn downcast<E, F>(expected: &'static str, predicate: F) -> Self
    where
        E: StdError + 'static,
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        TransError::Matches {
            expected,
            matcher: Arc::new(move |error: &Error| {
                error.downcast_ref::<E>().map_or(false, &predicate)
            }),
        }
    }

    fn check(&self, error: Error) -> Result<(), Report> {
        match self {
            TransError::Any => Ok(()),
            TransError::Matches { .. } if self.matches(&error) => Ok(()),
            TransError::Matches { expected, .. } => Err(eyre!("unexpected error"))
                .with_section(|| (*expected).header("Expected Error:"))
                .with_section(|| format!("{error:?}").header("Found Error:")),
        }
    }

    fn matches(&self, error: &Error) -> bool {
        match self {
            TransError::Any => true,
            TransError::Matches { matcher, .. } => matcher(error),
        }
    }
}

/// An ordered list of requests and their expected results.
#[must_use]
pub struct Transcript<R, S> {
    steps: Vec<(R, Result<S, TransError>)>,
}

impl<R, S, I> From<I> for Transcript<R, S>
where
    I: IntoIterator<Item = (R, Result<S, TransError>)>,
{
    fn from(steps: I) -> Self {
        Self {
            steps: steps.into_iter().collect(),
        }
    }
}

impl<R, S> Transcript<R, S>
where
    R: Debug,
    S: Debug + Eq,
{
    /// The number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if there are no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Send every request to `service` in order, and compare each result
    /// with the transcript. Stops at the first mismatch.
    pub async fn check<C>(self, mut service: C) -> Result<(), Report>
    where
        C: Service<R, Response = S>,
        C::Error: Into<Error>,
    {
        for (step, (request, expected)) in self.steps.into_iter().enumerate() {
            let request_text = format!("{request:?}");
            tracing::trace!(step, request = %request_text, "sending transcript request");

            let result = service
                .ready()
                .await
                .map_err(|e| eyre!(Into::<Error>::into(e)))
                .wrap_err("service failed while waiting for readiness")?
                .call(request)
                .await
                .map_err(Into::into);

            check_step(result, expected)
                .with_section(|| request_text.header("Request:"))
                .wrap_err_with(|| format!("transcript step {step} failed"))?;
        }

        Ok(())
    }
}

fn check_step<S>(result: Result<S, Error>, expected: Result<S, TransError>) -> Result<(), Report>
where
    S: Debug + Eq,
{
    match (result, expected) {
        (Ok(rsp), Ok(expected)) if rsp == expected => Ok(()),
        (Ok(rsp), Ok(expected)) => Err(eyre!("response doesn't match"))
            .with_section(|| format!("{expected:?}").header("Expected Response:"))
            .with_section(|| format!("{rsp:?}").header("Found Response:")),
        (Ok(rsp), Err(expected)) => Err(eyre!("accepted a request that should be rejected"))
            .with_section(|| format!("{expected:?}").header("Expected Error:"))
            .with_section(|| format!("{rsp:?}").header("Found Response:")),
        (Err(error), Ok(expected)) => Err(eyre!("rejected a request that should be accepted"))
            .with_section(|| format!("{expected:?}").header("Expected Response:"))
            .with_section(|| format!("{error:?}").header("Found Error:")),
        (Err(error), Err(expected)) => expected.check(error),
    }
}
