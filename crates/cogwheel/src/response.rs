use crate::Actor;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub name: String,
    pub icon_url: Option<String>,
}

impl From<&Actor> for Author {
    fn from(actor: &Actor) -> Self {
        Self {
            name: actor.name.clone(),
            icon_url: actor.avatar_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Footer {
    pub text: String,
    pub icon_url: Option<String>,
}

/// Structured data for an outbound message.
///
/// Responses carry no formatting of their own; the transport decides how a
/// title, description and fields are displayed, and fills in the configured
/// footer and colour when they are left empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub title: Option<String>,
    pub description: Option<String>,
    pub fields: Vec<Field>,
    pub author: Option<Author>,
    pub footer: Option<Footer>,
    pub color: Option<u32>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    /// A response with only a description, used for plain text replies.
    pub fn text(description: impl Into<String>) -> Self {
        Self::new().description(description)
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());

        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());

        self
    }

    pub fn field(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
        inline: bool,
    ) -> Self {
        self.fields.push(Field {
            name: name.into(),
            value: value.into(),
            inline,
        });

        self
    }

    pub fn author(mut self, author: impl Into<Author>) -> Self {
        self.author = Some(author.into());

        self
    }

    pub fn footer(mut self, text: impl Into<String>, icon_url: Option<String>) -> Self {
        self.footer = Some(Footer {
            text: text.into(),
            icon_url,
        });

        self
    }

    pub fn color(mut self, color: u32) -> Self {
        self.color = Some(color);

        self
    }

    /// Every piece of text in the response, for searching in logs and tests.
    pub fn text_content(&self) -> String {
        let mut parts = Vec::new();

        parts.extend(self.title.clone());
        parts.extend(self.description.clone());

        for field in &self.fields {
            parts.push(field.name.clone());
            parts.push(field.value.clone());
        }

        parts.join("\n")
    }
}
