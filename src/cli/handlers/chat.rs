//! Interactive chat through the client layer

use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use uuid::Uuid;

use crate::cli::output::print_info;
use crate::client::ChatClient;
use crate::config::ClientConfig;
use crate::AppConfig;
use crate::Result;

pub async fn handle_chat(config: &AppConfig, url: Option<String>) -> Result<()> {
    let client_config = ClientConfig {
        service_url: url.unwrap_or_else(|| config.client.service_url.clone()),
        ..config.client.clone()
    };
    let client = ChatClient::new(&client_config)?;
    let mut session_id = Uuid::new_v4().to_string();

    println!("💬 GovRAG Chat");
    println!("==============\n");
    print_info(&format!("Service: {}", client.chat_url()));
    print_info(&format!("Legacy fallback: {}", client.legacy_url()));
    print_info("Type your question and press Enter. '/new' starts a new conversation, 'exit' quits.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("You: ");
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();

        match input {
            "" => continue,
            "exit" | "quit" => break,
            "/new" => {
                session_id = Uuid::new_v4().to_string();
                print_info("Started a new conversation");
                continue;
            }
            _ => {}
        }

        println!("🤔 Thinking...");
        let text = client.ask_rendered(input, Some(&session_id)).await;
        println!("\nAssistant: {text}\n");
    }

    println!("👋 Goodbye");
    Ok(())
}
