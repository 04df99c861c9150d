//! Interactive journaling session

use application::VoiceChatService;
use domain::Conversation;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::describe_error;

/// What a line of input asks for
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Message(&'a str),
    Clear,
    Stop,
    Quit,
    Blank,
}

fn parse_input(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Blank,
        "/quit" | "/exit" => Input::Quit,
        "/clear" => Input::Clear,
        "/stop" => Input::Stop,
        text => Input::Message(text),
    }
}

/// Read entries from stdin until EOF, `/quit` or Ctrl-C
pub async fn run(service: &VoiceChatService, conversation: &mut Conversation) -> anyhow::Result<()> {
    println!("📓 Journal Voice ({}). /clear starts over, /stop silences, /quit exits.", service.settings().selection.provider);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else { break };

        match parse_input(&line) {
            Input::Blank => {},
            Input::Quit => break,
            Input::Clear => {
                service.reset(conversation);
                println!("🧹 New entry started");
            },
            Input::Stop => service.stop_speaking(),
            Input::Message(text) => match service.send(conversation, text).await {
                Ok(reply) => println!("🤖 {}", reply.content()),
                Err(e) => println!("❌ {}", describe_error(&e)),
            },
        }
    }

    service.stop_speaking();
    service.finish_speaking().await;
    Ok(())
}
