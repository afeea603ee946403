use std::io::Write;
use std::sync::Arc;

use scout_assistant::{ChatSession, GeminiSession, ModelSession, Navigator, ToolRouter};
use scout_core::types::{ChatMessage, Sender};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use super::Context;

/// Prints the routes the assistant opens; the CLI has no views to switch.
struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn navigate(&self, route: &str) {
        println!("[navigated to {route}]");
    }
}

pub async fn run(ctx: &Context) -> anyhow::Result<()> {
    let assistant = &ctx.settings.assistant;
    let model = GeminiSession::from_env(&assistant.api_key_env, assistant.model.as_str())
        .map(|session| {
            Box::new(session.with_base_url(assistant.api_base_url.as_str())) as Box<dyn ModelSession>
        });
    let tools = ToolRouter::new(ctx.client.clone(), Arc::new(PrintNavigator));
    let chat = ChatSession::new(model, tools).with_max_tool_rounds(assistant.max_tool_rounds);

    let stdin = BufReader::new(tokio::io::stdin());
    repl(chat, stdin, &mut std::io::stdout()).await
}

/// Read lines from `input` and relay them until EOF or `/quit`.
async fn repl<R, W>(mut chat: ChatSession, input: R, out: &mut W) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    for message in chat.messages() {
        print_message(out, message)?;
    }
    if !chat.is_enabled() {
        anyhow::bail!("chat is unavailable until the assistant credential is configured");
    }

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };
        if matches!(line.trim(), "/quit" | "/exit") {
            break;
        }
        if let Some(reply) = chat.submit(&line).await? {
            print_message(out, reply)?;
        }
    }
    Ok(())
}

fn print_message<W: Write>(out: &mut W, message: &ChatMessage) -> std::io::Result<()> {
    let who = match message.sender {
        Sender::Assistant => "scout",
        Sender::User => "you",
    };
    writeln!(out, "{who}: {}", message.text)
}
