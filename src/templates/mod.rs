//! HTML email bodies
//!
//! One tera template per notification type, all extending a shared layout.
//! Templates are compiled once on first use; a compile failure is reported
//! on every render instead of panicking.

use crate::core::{Note, NotificationType, Ticket};
use crate::error::DispatchError;
use once_cell::sync::Lazy;
use serde::Serialize;
use tera::{Context, Tera};

const LAYOUT: &str = r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{{ title }}</title>
</head>
<body style="font-family: Arial, sans-serif; line-height: 1.6; color: #333;">
    <div style="max-width: 600px; margin: 0 auto; padding: 20px;">
        {% block content %}{% endblock content %}
        {% if link %}<p><a href="{{ link | safe }}">View Ticket</a></p>{% endif %}
    </div>
</body>
</html>
"#;

const TICKET_CREATED: &str = r#"{% extends "layout.html" %}
{% block content %}
<h2>Ticket Created</h2>
<p>Hello {{ recipient_name }},</p>
<p>Your ticket has been created successfully:</p>
<ul>
    <li><strong>Ticket ID:</strong> {{ ticket.id }}</li>
    <li><strong>Subject:</strong> {{ ticket.subject }}</li>
    <li><strong>Status:</strong> {{ ticket.status }}</li>
</ul>
{% endblock content %}
"#;

const TICKET_ASSIGNED: &str = r#"{% extends "layout.html" %}
{% block content %}
<h2>Ticket Assignment Notification</h2>
<p>Hello {{ recipient_name }},</p>
<p>You have been assigned to a new ticket:</p>
<ul>
    <li><strong>Ticket ID:</strong> {{ ticket.id }}</li>
    <li><strong>Subject:</strong> {{ ticket.subject }}</li>
    <li><strong>Priority:</strong> {{ ticket.priority }}</li>
    <li><strong>Description:</strong> {{ ticket.description }}</li>
</ul>
{% endblock content %}
"#;

const TICKET_UPDATED: &str = r#"{% extends "layout.html" %}
{% block content %}
<h2>{{ title }}</h2>
<p>Hello {{ recipient_name }},</p>
<p>{{ message }}</p>
{% if ticket %}
<ul>
    <li><strong>Subject:</strong> {{ ticket.subject }}</li>
    <li><strong>Status:</strong> {{ ticket.status }}</li>
    <li><strong>Priority:</strong> {{ ticket.priority }}</li>
</ul>
{% endif %}
{% endblock content %}
"#;

const NOTE_ADDED: &str = r#"{% extends "layout.html" %}
{% block content %}
<h2>New Note Added</h2>
<p>Hello {{ recipient_name }},</p>
<p>{{ message }}</p>
{% if note_text %}
<blockquote style="border-left: 3px solid #ccc; padding-left: 10px;">
    {{ note_text }}
</blockquote>
{% endif %}
{% endblock content %}
"#;

const SLA_BREACH: &str = r#"{% extends "layout.html" %}
{% block content %}
<h2>SLA Breach Alert</h2>
<p>{{ message }}</p>
{% endblock content %}
"#;

static TEMPLATES: Lazy<Result<Tera, tera::Error>> = Lazy::new(|| {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("layout.html", LAYOUT),
        ("ticket_created.html", TICKET_CREATED),
        ("ticket_assigned.html", TICKET_ASSIGNED),
        ("ticket_updated.html", TICKET_UPDATED),
        ("note_added.html", NOTE_ADDED),
        ("sla_breach.html", SLA_BREACH),
    ])?;
    Ok(tera)
});

const fn template_name(kind: NotificationType) -> &'static str {
    match kind {
        NotificationType::TicketCreated => "ticket_created.html",
        NotificationType::TicketAssigned => "ticket_assigned.html",
        NotificationType::TicketUpdated => "ticket_updated.html",
        NotificationType::NoteAdded => "note_added.html",
        NotificationType::SlaBreach => "sla_breach.html",
    }
}

/// Values available to every email template
#[derive(Debug, Clone, Serialize)]
pub struct EmailContext {
    pub recipient_name: String,
    pub title: String,
    pub message: String,
    pub ticket: Option<Ticket>,
    pub note_text: Option<String>,
    pub link: Option<String>,
}

impl EmailContext {
    #[must_use]
    pub fn new(
        recipient_name: impl Into<String>,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_name: recipient_name.into(),
            title: title.into(),
            message: message.into(),
            ticket: None,
            note_text: None,
            link: None,
        }
    }

    #[must_use]
    pub fn with_ticket(mut self, ticket: Ticket, link: String) -> Self {
        self.ticket = Some(ticket);
        self.link = Some(link);
        self
    }

    #[must_use]
    pub fn with_note(mut self, note: &Note) -> Self {
        self.note_text = Some(note.text.clone());
        self
    }
}

/// Render the HTML body for a notification type
pub fn render_email(kind: NotificationType, context: &EmailContext) -> Result<String, DispatchError> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| DispatchError::Template(e.to_string()))?;
    let context =
        Context::from_serialize(context).map_err(|e| DispatchError::Template(e.to_string()))?;
    tera.render(template_name(kind), &context)
        .map_err(|e| DispatchError::Template(e.to_string()))
}
