//! The serenity-backed [`Transport`].

use std::sync::Arc;

use cogwheel::{Id, Response, Role, Transport, TransportError, async_trait};
use serenity::all::{
    ChannelId, CreateEmbed, CreateEmbedAuthor, CreateEmbedFooter, CreateMessage, GuildId, Http,
    MessageId, ReactionType, RoleId, UserId,
};

use crate::ConfigStore;

pub struct DiscordTransport {
    http: Arc<Http>,
    config: Arc<ConfigStore>,
}

impl DiscordTransport {
    pub fn new(http: Arc<Http>, config: Arc<ConfigStore>) -> Self {
        Self { http, config }
    }

    /// Renders a response as an embed, filling the footer and colour from the
    /// config when the response leaves them empty.
    pub fn render(&self, response: Response) -> CreateEmbed {
        let config = self.config.get();
        let mut embed = CreateEmbed::new();

        if let Some(title) = response.title {
            embed = embed.title(title);
        }

        if let Some(description) = response.description {
            embed = embed.description(description);
        }

        for field in response.fields {
            embed = embed.field(field.name, field.value, field.inline);
        }

        if let Some(author) = response.author {
            let mut builder = CreateEmbedAuthor::new(author.name);

            if let Some(icon_url) = author.icon_url {
                builder = builder.icon_url(icon_url);
            }

            embed = embed.author(builder);
        }

        let footer = match response.footer {
            Some(footer) => CreateEmbedFooter::new(footer.text)
                .icon_url(footer.icon_url.unwrap_or_else(|| config.footer.icon_url.clone())),
            None => CreateEmbedFooter::new(&config.footer.text).icon_url(&config.footer.icon_url),
        };

        embed
            .footer(footer)
            .color(response.color.unwrap_or(config.embed.color))
    }
}

fn transport_error(error: serenity::Error) -> TransportError {
    let status = match &error {
        serenity::Error::Http(http) => http.status_code().map(|status| status.as_u16()),
        _ => None,
    };

    match status {
        Some(403) => TransportError::forbidden(error.to_string()),
        Some(404) => TransportError::not_found(error.to_string()),
        _ => TransportError::other(error.to_string()),
    }
}

fn role(role: &serenity::all::Role) -> Role {
    Role {
        id: role.id.get(),
        name: role.name.clone(),
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn send_response(
        &self,
        channel_id: Id,
        response: Response,
    ) -> Result<(), TransportError> {
        let message = CreateMessage::new().embed(self.render(response));

        ChannelId::new(channel_id)
            .send_message(&*self.http, message)
            .await
            .map(|_| ())
            .map_err(transport_error)
    }

    async fn add_reaction(
        &self,
        channel_id: Id,
        message_id: Id,
        emoji: &str,
    ) -> Result<(), TransportError> {
        ChannelId::new(channel_id)
            .create_reaction(
                &*self.http,
                MessageId::new(message_id),
                ReactionType::Unicode(emoji.to_string()),
            )
            .await
            .map_err(transport_error)
    }

    async fn get_guild_roles(&self, guild_id: Id) -> Result<Vec<Role>, TransportError> {
        let roles = GuildId::new(guild_id)
            .roles(&*self.http)
            .await
            .map_err(transport_error)?;

        let mut roles = roles.into_values().collect::<Vec<_>>();
        roles.sort_by_key(|role| (role.position, role.id));

        Ok(roles.iter().map(role).collect())
    }

    async fn get_actor_roles(
        &self,
        guild_id: Id,
        actor_id: Id,
    ) -> Result<Vec<Role>, TransportError> {
        let member = GuildId::new(guild_id)
            .member(&*self.http, UserId::new(actor_id))
            .await
            .map_err(transport_error)?;

        let held = member.roles.iter().map(|id| id.get()).collect::<Vec<_>>();

        Ok(self
            .get_guild_roles(guild_id)
            .await?
            .into_iter()
            .filter(|role| held.contains(&role.id))
            .collect())
    }

    async fn add_role(
        &self,
        guild_id: Id,
        actor_id: Id,
        role: &Role,
    ) -> Result<(), TransportError> {
        self.http
            .add_member_role(
                GuildId::new(guild_id),
                UserId::new(actor_id),
                RoleId::new(role.id),
                None,
            )
            .await
            .map_err(transport_error)
    }

    async fn remove_role(
        &self,
        guild_id: Id,
        actor_id: Id,
        role: &Role,
    ) -> Result<(), TransportError> {
        self.http
            .remove_member_role(
                GuildId::new(guild_id),
                UserId::new(actor_id),
                RoleId::new(role.id),
                None,
            )
            .await
            .map_err(transport_error)
    }
}
