//! Fixed chat copy.

pub const ONBOARDING: &str = "👋 Hi! This bot brings your tasks, meetings and reminders into chat.\n\n\
To get started, open the app, go to Settings → Chat integration, and tap \"Link chat\". \
You'll be sent back here with a one-time code.";

pub const NOT_LINKED: &str = "🔒 Your chat isn't linked to an account yet.\n\n\
Open the app, go to Settings → Chat integration, and tap \"Link chat\" to connect it.";

pub const INVALID_CODE: &str = "❌ That linking code is invalid or has expired.\n\n\
Generate a new one from the app and try again.";

pub const TENANT_MISSING: &str = "⚠️ Your organization could not be found. \
Please contact your administrator.";

pub const ALREADY_LINKED: &str = "⚠️ This chat is already linked to a different account.\n\n\
Send /unlink first, then use the new link from the app.";

pub const TEMPORARY_FAILURE: &str = "😕 Something went wrong on our side. Please try again in a moment.";

pub const UNKNOWN_COMMAND: &str = "🤔 I don't know that command. Send /help to see what I can do.";

pub const HELP: &str = "Here's what I can do:\n\n\
/tasks - your pending tasks\n\
/today - today's tasks, meetings and EOD status\n\
/streak - your EOD streak\n\
/leaderboard - open the team leaderboard\n\
/unlink - disconnect this chat from your account\n\
/help - show this message";

pub const UNLINK_PROMPT: &str = "Are you sure you want to unlink this chat? \
You'll stop receiving notifications here.";

pub const UNLINK_DONE: &str = "🔓 This chat has been unlinked. \
You can link it again at any time from the app.";

pub const UNLINK_CANCELLED: &str = "👍 Unlink cancelled. Your chat is still linked.";
