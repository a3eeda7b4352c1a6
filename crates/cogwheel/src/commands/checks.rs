use async_fn_traits::AsyncFn1;
use async_trait::async_trait;

use crate::{CommandError, commands::Context};

/// A permission predicate evaluated before a command runs.
///
/// Returning `Ok(false)` is reported as
/// [`Error::CheckFailure`](crate::Error::CheckFailure); a check may also
/// return a more specific error itself.
#[async_trait]
pub trait Check<E, S>: Send + Sync + 'static {
    async fn run(&self, context: Context<E, S>) -> Result<bool, E>;
}

#[async_trait]
impl<E, S, F> Check<E, S> for F
where
    E: CommandError,
    S: Clone + Send + Sync + 'static,
    F: AsyncFn1<Context<E, S>, Output = Result<bool, E>> + Send + Sync + 'static,
    F::OutputFuture: Send,
{
    async fn run(&self, context: Context<E, S>) -> Result<bool, E> {
        (self)(context).await
    }
}
