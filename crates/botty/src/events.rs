use cogwheel::{Actor, Event, async_trait};
use serenity::all::{Context, EventHandler, Message, Ready, User};
use tokio::sync::mpsc::UnboundedSender;

/// Forwards gateway events to the command client, in the order they arrive.
pub struct Events {
    pub sender: UnboundedSender<Event>,
}

impl Events {
    fn forward(&self, event: Event) {
        if self.sender.send(event).is_err() {
            log::warn!("Dropping gateway event, the command client has stopped");
        }
    }
}

fn actor(user: &User) -> Actor {
    Actor {
        id: user.id.get(),
        name: user.name.clone(),
        bot: user.bot,
        avatar_url: user.avatar_url(),
    }
}

pub fn inbound(message: &Message) -> cogwheel::Message {
    cogwheel::Message {
        id: message.id.get(),
        channel_id: message.channel_id.get(),
        guild_id: message.guild_id.map(|id| id.get()),
        author: actor(&message.author),
        content: message.content.clone(),
    }
}

#[async_trait]
impl EventHandler for Events {
    async fn message(&self, _ctx: Context, message: Message) {
        log::trace!("gateway message {} in {}", message.id, message.channel_id);

        self.forward(Event::Message(inbound(&message)));
    }

    async fn ready(&self, _ctx: Context, ready: Ready) {
        self.forward(Event::Ready {
            user: actor(&ready.user),
        });
    }
}
