//! Simple query example
//!
//! Demonstrates basic usage of the query function

use futures::StreamExt;
use prism_stream::{query, AgentOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Configure the agent
    let options = AgentOptions::builder()
        .system_prompt("You are a helpful assistant")
        .model("claude-3-5-sonnet-20241022")
        .api_key(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())
        .temperature(0.7)
        .max_tokens(500)
        .build()?;

    println!("Sending query to model...\n");

    // Send query and stream response
    let mut stream = query("What's the capital of France? Please be brief.", &options).await?;

    print!("Response: ");

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(text) = chunk.text {
            print!("{text}");
            std::io::Write::flush(&mut std::io::stdout())?;
        }
        if let Some(tool_calls) = chunk.tool_calls {
            for call in tool_calls {
                println!("\nTool called: {} (id: {})", call.name, call.id);
                println!("Arguments: {}", call.input);
            }
        }
    }

    println!("\n\nQuery complete!");

    Ok(())
}
