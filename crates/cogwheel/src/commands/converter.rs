use async_trait::async_trait;

use crate::{CommandError, Error, Role, commands::Context};

/// Parses one parameter of a command from the invocation's words.
#[async_trait]
pub trait Converter<E: CommandError, S: Send + Sync>: Sized {
    async fn from_context(context: &Context<E, S>) -> Result<Self, E> {
        let position = context.words.current_position();
        let input = context
            .words
            .next()
            .ok_or(Error::MissingParameter { position })?;

        Self::convert(context, input).await
    }

    async fn convert(context: &Context<E, S>, input: String) -> Result<Self, E>;
}

macro_rules! integer_converters {
    ($($ty: ty),+ $(,)?) => {
        $(
            #[async_trait]
            impl<E: CommandError, S: Send + Sync> Converter<E, S> for $ty {
                async fn convert(_context: &Context<E, S>, input: String) -> Result<Self, E> {
                    input.parse::<$ty>().map_err(|_| {
                        Error::BadArgument {
                            expected: "a whole number".to_string(),
                            input,
                        }
                        .into()
                    })
                }
            }
        )+
    };
}

integer_converters!(u32, u64, i64, usize);

#[async_trait]
impl<E: CommandError, S: Send + Sync> Converter<E, S> for String {
    async fn convert(_context: &Context<E, S>, input: String) -> Result<Self, E> {
        Ok(input)
    }
}

/// Optional parameters are `None` once the words run out.
#[async_trait]
impl<E, S, T> Converter<E, S> for Option<T>
where
    E: CommandError,
    S: Send + Sync,
    T: Converter<E, S> + Send,
{
    async fn from_context(context: &Context<E, S>) -> Result<Self, E> {
        if context.words.is_exhausted() {
            return Ok(None);
        }

        T::from_context(context).await.map(Some)
    }

    async fn convert(context: &Context<E, S>, input: String) -> Result<Self, E> {
        T::convert(context, input).await.map(Some)
    }
}

/// The remaining words, possibly none.
#[async_trait]
impl<E: CommandError, S: Send + Sync> Converter<E, S> for Vec<String> {
    async fn from_context(context: &Context<E, S>) -> Result<Self, E> {
        Ok(context.words.rest())
    }

    async fn convert(_context: &Context<E, S>, input: String) -> Result<Self, E> {
        Ok(vec![input])
    }
}

/// Greedy trailing string: everything after the previous parameters,
/// verbatim.
pub struct ConsumeRest(pub String);

#[async_trait]
impl<E: CommandError, S: Send + Sync> Converter<E, S> for ConsumeRest {
    async fn from_context(context: &Context<E, S>) -> Result<Self, E> {
        let position = context.words.current_position();
        let rest = context.words.rest_raw();

        if rest.is_empty() {
            return Err(Error::MissingParameter { position }.into());
        }

        Ok(Self(rest))
    }

    async fn convert(_context: &Context<E, S>, input: String) -> Result<Self, E> {
        Ok(Self(input))
    }
}

fn find_role(roles: Vec<Role>, input: String) -> Result<Role, Error> {
    let wanted = input.to_lowercase();

    roles
        .into_iter()
        .find(|role| role.name.to_lowercase() == wanted)
        .ok_or(Error::ArgumentNotFound {
            kind: "Role".to_string(),
            input,
        })
}

/// A role of the current guild, matched by name ignoring case. Consumes the
/// rest of the input so names may contain spaces.
#[derive(Debug, Clone)]
pub struct GuildRole(pub Role);

#[async_trait]
impl<E: CommandError, S: Send + Sync> Converter<E, S> for GuildRole {
    async fn from_context(context: &Context<E, S>) -> Result<Self, E> {
        let ConsumeRest(input) = <ConsumeRest as Converter<E, S>>::from_context(context).await?;

        Self::convert(context, input).await
    }

    async fn convert(context: &Context<E, S>, input: String) -> Result<Self, E> {
        let roles = context.guild_roles().await?;

        Ok(Self(find_role(roles, input)?))
    }
}

/// One of the invoking actor's own roles, matched by name ignoring case.
/// Consumes the rest of the input.
#[derive(Debug, Clone)]
pub struct AuthorRole(pub Role);

#[async_trait]
impl<E: CommandError, S: Send + Sync> Converter<E, S> for AuthorRole {
    async fn from_context(context: &Context<E, S>) -> Result<Self, E> {
        let ConsumeRest(input) = <ConsumeRest as Converter<E, S>>::from_context(context).await?;

        Self::convert(context, input).await
    }

    async fn convert(context: &Context<E, S>, input: String) -> Result<Self, E> {
        let roles = context.author_roles().await?;

        Ok(Self(find_role(roles, input)?))
    }
}
