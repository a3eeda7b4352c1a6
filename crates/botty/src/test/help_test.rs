use cogwheel::testing::direct_message;

use super::Harness;

fn field(response: &cogwheel::Response, name: &str) -> Option<String> {
    response
        .fields
        .iter()
        .find(|field| field.name == name)
        .map(|field| field.value.clone())
}

#[tokio::test]
async fn test_help_menu_lists_extensions() {
    let bot = Harness::new();

    bot.send("!help").await;

    let reply = bot.reply();

    assert_eq!(reply.title.as_deref(), Some("\u{1f4f0} Help Menu [1/1]"));
    assert!(
        reply
            .description
            .as_deref()
            .is_some_and(|text| text.ends_with("use `!help <command>`"))
    );
    assert_eq!(
        field(&reply, "Botty McBotface").as_deref(),
        Some(
            "The commands used to self-administer roles and similar actions.\n\
             Commands:\n`addrole`, `ping`, `removerole`"
        )
    );
    assert!(field(&reply, "Help").is_some());
    assert!(!reply.text_content().contains("reload"));
}

#[tokio::test]
async fn test_help_menu_hides_guild_commands_in_direct_messages() {
    let bot = Harness::new();

    bot.dispatch(direct_message("!help")).await;

    assert!(
        field(&bot.reply(), "Botty McBotface")
            .is_some_and(|value| value.ends_with("Commands:\n`ping`"))
    );
}

#[tokio::test]
async fn test_command_help() {
    let bot = Harness::new();

    bot.send("!help addrole").await;

    let reply = bot.reply();

    assert_eq!(reply.title.as_deref(), Some("'Addrole' Help"));
    assert_eq!(
        reply.description.as_deref(),
        Some("Adds a server role to self. Case insensitive.")
    );
    assert_eq!(field(&reply, "Usage").as_deref(), Some("`!addrole [role...]`"));
    assert_eq!(field(&reply, "Example").as_deref(), Some("`!addrole CYBV 301`"));
    assert_eq!(field(&reply, "Aliases"), None);
}

#[tokio::test]
async fn test_extension_help() {
    let bot = Harness::new();

    bot.send("!help botty").await;

    let reply = bot.reply();

    assert_eq!(reply.title.as_deref(), Some("Botty McBotface Help"));
    assert_eq!(
        field(&reply, "Commands").as_deref(),
        Some("`addrole`\n`ping`\n`removerole`")
    );
}

#[tokio::test]
async fn test_hidden_command_is_not_found() {
    let bot = Harness::new();

    bot.send("!help reload").await;

    assert_eq!(
        bot.reply().description.as_deref(),
        Some("No command or extension called `reload`.")
    );
}
