use crate::types::CommitEvent;

/// Slack text announcing a commit on main.
pub fn format_notification(event: &CommitEvent) -> String {
    format!(
        "🚀 New commit pushed to *main*!\n*Author:* {}\n*Message:* {}\n*Link:* {}",
        event.author, event.message, event.url
    )
}
