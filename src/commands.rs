//! CLI command handlers.
//!
//! Each handler runs one user-facing flow against [`AppState`] and prints the
//! outcome. Errors come back as display strings; `main` prints them and exits
//! non-zero.

use std::path::{Path, PathBuf};

use anonbox_client::api::types::{InboxFilters, MessageStatus};
use anonbox_client::api::ApiError;
use anonbox_client::auth::{Navigator, Route};
use anonbox_client::services::{InboxState, MessageActions, SendState};
use anonbox_client::validation;
use anonbox_client::AppState;

/// Navigator for a terminal: prints the absolute link of every route.
pub struct LinkNavigator {
    app_url: String,
}

impl LinkNavigator {
    pub fn new(app_url: &str) -> Self {
        Self {
            app_url: app_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Navigator for LinkNavigator {
    fn navigate(&self, route: Route) {
        match &route {
            Route::Home => println!("Signed out. Home: {}{}", self.app_url, route.path()),
            Route::SaveLink { .. } => {
                println!("Save your private link now, it is the only way back to your inbox:");
                println!("  {}{}", self.app_url, route.path());
            }
            Route::Inbox { .. } => println!("Inbox: {}{}", self.app_url, route.path()),
            Route::PublicProfile { .. } => println!("Profile: {}{}", self.app_url, route.path()),
        }
    }
}

/// Render an API error with its per-field details.
fn describe(err: &ApiError) -> String {
    let mut out = err.message().to_string();
    for (field, msgs) in err.field_errors() {
        for msg in msgs {
            out.push_str(&format!("\n  {}: {}", field, msg));
        }
    }
    out
}

/// Fail unless a session is held; private endpoints need the token header.
fn require_session(state: &AppState) -> Result<(), String> {
    if state.auth.is_authenticated() {
        Ok(())
    } else {
        Err("No active session. Run `anonbox login <token>` or `anonbox register <name>` first.".to_string())
    }
}

/// Turn a private-call failure into a message, noticing a 401 wipe.
fn private_failure(state: &mut AppState, message: String) -> String {
    if !state.auth.sync_with_store() {
        format!("{}\nYour stored session has been cleared.", message)
    } else {
        message
    }
}

// ── Session ──────────────────────────────────────────────────────────────

pub async fn register(state: &mut AppState, display_name: &str) -> Result<(), String> {
    validation::validate_display_name(display_name).map_err(|e| e.to_string())?;
    log::info!("Registering new profile");

    let reg = state.auth.register(display_name).await.map_err(|e| describe(&e))?;

    println!("Profile created for {} (@{})", reg.user.display_name, reg.user.handle);
    println!("Private inbox: {}", state.config.app_link(&reg.inbox_path));
    println!("Share this to receive messages: {}", state.public_link(&reg.user.handle));
    Ok(())
}

pub async fn login(state: &mut AppState, token: &str) -> Result<(), String> {
    let user = state
        .auth
        .login_with_token(token.trim())
        .await
        .map_err(|e| describe(&e))?;
    println!("Logged in as {} (@{})", user.display_name, user.handle);
    Ok(())
}

pub async fn verify(state: &mut AppState) -> Result<(), String> {
    let token = state
        .auth
        .private_token()
        .map(str::to_string)
        .ok_or_else(|| "No stored session to verify.".to_string())?;

    let verified = state.auth.verify_session(&token).await.map_err(|e| describe(&e))?;
    println!(
        "Session valid for @{} ({} unread)",
        verified.user.handle, verified.unread_count
    );
    Ok(())
}

pub fn whoami(state: &AppState) -> Result<(), String> {
    println!("State: {}", state.auth.state().label());
    if let Some(identity) = state.auth.identity() {
        println!("Handle: @{}", identity.handle);
        println!("Display name: {}", identity.display_name);
        println!("Public link: {}", state.public_link(&identity.handle));
    }
    Ok(())
}

pub fn logout(state: &mut AppState) -> Result<(), String> {
    state.auth.logout();
    Ok(())
}

pub async fn regenerate_token(state: &mut AppState) -> Result<(), String> {
    require_session(state)?;
    state
        .auth
        .regenerate_token()
        .await
        .map(|_| ())
        .map_err(|e| describe(&e))?;
    println!("Your previous private link no longer works.");
    Ok(())
}

// ── Public ───────────────────────────────────────────────────────────────

pub async fn profile(state: &AppState, handle: &str) -> Result<(), String> {
    let profile = state
        .api
        .get_public_profile(handle)
        .await
        .map_err(|e| describe(&e))?;
    println!("{} (@{})", profile.display_name, profile.handle);
    for prompt in &profile.prompts {
        println!("  [{}] {}", prompt.id, prompt.text);
    }
    Ok(())
}

pub async fn send(state: &AppState, handle: &str, content: &str, prompt_id: Option<u64>) -> Result<(), String> {
    validation::validate_message(content).map_err(|e| e.to_string())?;

    let mut form = SendState::new(state.api.clone());
    form.send(handle, content.trim(), prompt_id).await;
    match form.error {
        Some(message) => Err(message),
        None => {
            println!("Message sent.");
            Ok(())
        }
    }
}

pub async fn health(state: &AppState) -> Result<(), String> {
    let health = state.api.check_health().await.map_err(|e| describe(&e))?;
    println!(
        "{} (version {}, {})",
        health.status,
        health.version.as_deref().unwrap_or("unknown"),
        health.timestamp.as_deref().unwrap_or("-")
    );
    Ok(())
}

// ── Inbox ────────────────────────────────────────────────────────────────

pub async fn inbox(state: &mut AppState, status: Option<MessageStatus>, prompt_id: Option<u64>) -> Result<(), String> {
    require_session(state)?;

    let mut inbox = InboxState::new(state.api.clone());
    inbox.load(&InboxFilters { status, prompt_id }).await;
    if let Some(message) = inbox.error {
        return Err(private_failure(state, message));
    }

    println!("{} messages, {} unread", inbox.total_count, inbox.unread_count);
    for msg in &inbox.messages {
        let marker = match msg.status {
            MessageStatus::Unread => "*",
            MessageStatus::Read => " ",
        };
        println!("{} #{} {}", marker, msg.id, msg.content);
        if let Some(reply) = &msg.response_text {
            println!("      -> {}", reply);
        }
    }
    if inbox.messages.is_empty() {
        println!("No messages yet.");
    }
    Ok(())
}

/// Single-message action selected on the command line.
pub enum MessageAction {
    Read,
    Reply(String),
    Delete,
    Share,
}

pub async fn message_action(state: &mut AppState, message_id: u64, action: MessageAction) -> Result<(), String> {
    require_session(state)?;

    let mut actions = MessageActions::new(state.api.clone());
    let done = match action {
        MessageAction::Read => actions.mark_as_read(message_id).await.map(|a| a.message),
        MessageAction::Reply(text) => {
            validation::validate_message(&text).map_err(|e| e.to_string())?;
            actions.reply(message_id, text.trim()).await.map(|r| match r.card_url {
                Some(url) => format!("{} Card: {}", r.message, url),
                None => r.message,
            })
        }
        MessageAction::Delete => actions.remove(message_id).await.map(|a| a.message),
        MessageAction::Share => actions.share(message_id).await.map(|a| a.message),
    };

    match (done, actions.error) {
        (Some(message), _) => {
            println!("{}", if message.is_empty() { "Done." } else { message.as_str() });
            Ok(())
        }
        (None, Some(message)) => Err(private_failure(state, message)),
        (None, None) => Err("Action failed.".to_string()),
    }
}

/// Local path for a downloaded card.
///
/// Without an explicit output only the final component of the server's
/// filename is used, so the file always lands in the working directory.
fn card_output_path(filename: &str, output: Option<&Path>) -> Result<PathBuf, String> {
    if let Some(path) = output {
        return Ok(path.to_path_buf());
    }
    match Path::new(filename).file_name() {
        Some(name) => Ok(PathBuf::from(name)),
        None => Err(format!("Server returned an unusable card filename: {:?}", filename)),
    }
}

pub async fn card(state: &mut AppState, message_id: u64, output: Option<&Path>) -> Result<(), String> {
    require_session(state)?;

    let mut actions = MessageActions::new(state.api.clone());
    let Some(card) = actions.generate_card(message_id).await else {
        let message = actions.error.unwrap_or_else(|| "Card generation failed.".to_string());
        return Err(private_failure(state, message));
    };

    let path = card_output_path(&card.filename, output)?;
    tokio::fs::write(&path, &card.bytes)
        .await
        .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
    println!("Card saved to {} ({} bytes)", path.display(), card.bytes.len());
    Ok(())
}

pub async fn cleanup_cards(state: &mut AppState) -> Result<(), String> {
    require_session(state)?;
    match state.api.cleanup_cards().await {
        Ok(count) => {
            println!("Removed {} old cards.", count);
            Ok(())
        }
        Err(e) => Err(private_failure(state, describe(&e))),
    }
}

// ── Prompts ──────────────────────────────────────────────────────────────

pub async fn prompt_create(state: &mut AppState, text: &str) -> Result<(), String> {
    require_session(state)?;
    validation::validate_prompt(text).map_err(|e| e.to_string())?;

    match state.api.create_prompt(text.trim()).await {
        Ok(prompt) => {
            println!("Question #{} created: {}", prompt.id, prompt.text);
            if let Some(url) = prompt.share_url {
                println!("Share it: {}", url);
            }
            Ok(())
        }
        Err(e) => Err(private_failure(state, describe(&e))),
    }
}

pub async fn prompt_list(state: &AppState, handle: &str) -> Result<(), String> {
    let prompts = state.api.get_user_prompts(handle).await.map_err(|e| describe(&e))?;
    if prompts.is_empty() {
        println!("No questions yet.");
    }
    for prompt in prompts {
        println!("[{}] {} (shared {} times)", prompt.id, prompt.text, prompt.share_count.unwrap_or(0));
    }
    Ok(())
}

pub async fn prompt_show(state: &AppState, id: u64) -> Result<(), String> {
    let prompt = state.api.get_prompt(id).await.map_err(|e| describe(&e))?;
    match prompt.user_handle {
        Some(handle) => println!("[{}] {} (by @{})", prompt.id, prompt.text, handle),
        None => println!("[{}] {}", prompt.id, prompt.text),
    }
    Ok(())
}

pub async fn prompt_share(state: &AppState, id: u64) -> Result<(), String> {
    let count = state.api.increment_prompt_share(id).await.map_err(|e| describe(&e))?;
    println!("Question #{} shared {} times", id, count);
    Ok(())
}

pub async fn prompt_delete(state: &mut AppState, id: u64) -> Result<(), String> {
    require_session(state)?;
    match state.api.delete_prompt(id).await {
        Ok(_) => {
            println!("Question #{} deleted.", id);
            Ok(())
        }
        Err(e) => Err(private_failure(state, describe(&e))),
    }
}
