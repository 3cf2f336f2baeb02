/// Fireside CLI - operator front end for the chat synchronization core
use colored::*;
use fireside_core::{
    ChatSync, Config, DashboardSync, FiresideError, Message, SharedStore, SledStore, UserDirectory,
};
use std::env;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = env::args().collect();
    let config = Config::from_args(&args)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    if config.command.is_empty() {
        print_usage();
        return Ok(());
    }

    std::fs::create_dir_all(&config.data_dir)?;
    let store: SharedStore = Arc::new(SledStore::open(&config.data_dir)?);

    let command: Vec<&str> = config.command.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["register", name, email] => register(store, name, email).await?,
        ["contacts", owner] => contacts(store, owner).await?,
        ["send", from, to, text @ ..] if !text.is_empty() => {
            send(store, from, to, &text.join(" ")).await?
        }
        ["history", owner, peer] => history(store, owner, peer).await?,
        ["watch", owner, peer] => watch(store, owner, peer).await?,
        ["delete", name1, name2, sender, millis, text @ ..] if !text.is_empty() => {
            let millis: i64 = millis
                .parse()
                .map_err(|_| anyhow::anyhow!("timestamp must be milliseconds since epoch"))?;
            delete(store, name1, name2, sender, millis, &text.join(" ")).await?
        }
        _ => {
            eprintln!("{} Unknown or incomplete command", "✗".red().bold());
            print_usage();
        }
    }

    Ok(())
}

fn print_usage() {
    println!("{}", "🔥 Fireside".bright_cyan().bold());
    println!();
    println!("{}", "Usage:".bright_white().bold());
    println!("  fireside [--data-dir <path>] <command> [args]");
    println!();
    println!("{}", "Commands:".bright_white().bold());
    println!(
        "  {} <name> <email>                     Add a participant to the directory",
        "register".cyan()
    );
    println!(
        "  {} <owner>                            List conversations with unread state",
        "contacts".cyan()
    );
    println!(
        "  {} <from> <to> <message>              Send a message",
        "send".cyan()
    );
    println!(
        "  {} <owner> <peer>                     Print a conversation (marks it read)",
        "history".cyan()
    );
    println!(
        "  {} <owner> <peer>                     Follow a conversation live",
        "watch".cyan()
    );
    println!(
        "  {} <a> <b> <sender> <millis> <text>   Delete a message from both ledgers",
        "delete".cyan()
    );
}

async fn register(store: SharedStore, name: &str, email: &str) -> anyhow::Result<()> {
    let directory = UserDirectory::new(store);
    let token = directory.register(name, email).await?;
    println!(
        "{} Registered {} ({})",
        "✓".green(),
        name.cyan(),
        email
    );
    println!("  token: {}", token.dimmed());
    Ok(())
}

async fn contacts(store: SharedStore, owner: &str) -> anyhow::Result<()> {
    let dashboard = DashboardSync::new(store);
    let mut feed = dashboard.list_conversations(owner).await?;
    let rows = feed
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("conversation feed closed"))??;

    if rows.is_empty() {
        println!("No conversations yet for {}", owner.cyan());
        return Ok(());
    }
    for (peer, status) in rows {
        println!("  {}  {}", peer.cyan(), status.to_string().dimmed());
    }
    Ok(())
}

async fn send(store: SharedStore, from: &str, to: &str, text: &str) -> anyhow::Result<()> {
    let dashboard = DashboardSync::new(store.clone());
    let recipient = match dashboard.resolve_recipient(to).await {
        Ok(name) => name,
        Err(FiresideError::RecipientUnknown(name)) => {
            eprintln!("{} No such user: {}", "✗".red().bold(), name.red());
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let chat = ChatSync::new(store);
    let now = chrono::Utc::now().timestamp_millis();
    chat.send_message(from, &recipient, text, now).await?;
    println!("{} Sent to {}", "✓".green(), recipient.cyan());
    Ok(())
}

async fn history(store: SharedStore, owner: &str, peer: &str) -> anyhow::Result<()> {
    let chat = ChatSync::new(store);
    let mut feed = chat.fetch_ledger(owner, peer).await?;
    let messages = feed
        .next()
        .await
        .ok_or_else(|| anyhow::anyhow!("ledger feed closed"))??;

    if messages.is_empty() {
        println!("No messages with {}", peer.cyan());
        return Ok(());
    }
    for message in &messages {
        print_message(message);
    }
    Ok(())
}

async fn watch(store: SharedStore, owner: &str, peer: &str) -> anyhow::Result<()> {
    let chat = ChatSync::new(store);
    let mut feed = chat.fetch_ledger(owner, peer).await?;
    println!(
        "Watching {} ↔ {} (ctrl-c to stop)",
        owner.cyan(),
        peer.cyan()
    );
    while let Some(snapshot) = feed.next().await {
        let messages = snapshot?;
        println!("{}", "── snapshot ──".dimmed());
        for message in &messages {
            print_message(message);
        }
    }
    Ok(())
}

async fn delete(
    store: SharedStore,
    name1: &str,
    name2: &str,
    sender: &str,
    millis: i64,
    text: &str,
) -> anyhow::Result<()> {
    let chat = ChatSync::new(store);
    let message = Message::new(sender, text, millis);
    chat.delete_message(&message, name1, name2).await?;
    println!("{} Message deleted from both ledgers", "✓".green());
    Ok(())
}

fn print_message(message: &Message) {
    let when = chrono::DateTime::from_timestamp_millis(message.sent_at_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| message.sent_at_millis.to_string());
    println!(
        "  [{}] {}: {}",
        when.dimmed(),
        message.sender.cyan(),
        message.text
    );
}
