//! Calculator with Tools Example
//!
//! Demonstrates registering tools and letting the client's built-in tool
//! driver execute them automatically across a bounded chain of hops.

use futures::StreamExt;
use prism_stream::{tool, AgentOptions, Client};
use serde_json::json;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let add_tool = tool("add", "Add two numbers")
        .param("a", "number")
        .param("b", "number")
        .build(|args| async move {
            let a = args["a"].as_f64().unwrap_or(0.0);
            let b = args["b"].as_f64().unwrap_or(0.0);
            Ok(json!({"result": a + b}))
        });

    let subtract_tool = tool("subtract", "Subtract two numbers")
        .param("a", "number")
        .param("b", "number")
        .build(|args| async move {
            let a = args["a"].as_f64().unwrap_or(0.0);
            let b = args["b"].as_f64().unwrap_or(0.0);
            Ok(json!({"result": a - b}))
        });

    let multiply_tool = tool("multiply", "Multiply two numbers")
        .param("a", "number")
        .param("b", "number")
        .build(|args| async move {
            let a = args["a"].as_f64().unwrap_or(0.0);
            let b = args["b"].as_f64().unwrap_or(0.0);
            Ok(json!({"result": a * b}))
        });

    let divide_tool = tool("divide", "Divide two numbers")
        .param("a", "number")
        .param("b", "number")
        .build(|args| async move {
            let a = args["a"].as_f64().unwrap_or(0.0);
            let b = args["b"].as_f64().unwrap_or(0.0);
            if b == 0.0 {
                return Err(prism_stream::Error::tool("cannot divide by zero"));
            }
            Ok(json!({"result": a / b}))
        });

    // Configure agent with tools. max_steps allows the model to call a tool,
    // see the result, and reply in a follow-up hop without the caller driving
    // that loop manually.
    let options = AgentOptions::builder()
        .system_prompt(
            "You are a helpful calculator assistant. \
             Use the provided tools to perform calculations. \
             Always show your work and explain the result.",
        )
        .model("claude-3-5-sonnet-20241022")
        .api_key(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())
        .tools(vec![add_tool, subtract_tool, multiply_tool, divide_tool])
        .max_steps(5)
        .temperature(0.1)
        .build()?;

    let queries = vec![
        "What is 25 plus 17?",
        "Calculate 144 divided by 12",
        "What's 7 times 8, then add 5?",
    ];

    println!("{}", "=".repeat(70));
    println!("CALCULATOR TOOLS EXAMPLE");
    println!("{}", "=".repeat(70));
    println!();

    for query in queries {
        println!("User: {query}");
        println!("{}", "-".repeat(50));

        let mut client = Client::new(options.clone())?;
        let mut stream = client.send(query).await?;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(text) = chunk.text {
                if !text.trim().is_empty() {
                    print!("{text}");
                }
            }
            if let Some(tool_calls) = chunk.tool_calls {
                for call in tool_calls {
                    println!("\n🔧 Tool call: {} ({})", call.name, call.input);
                }
            }
        }

        println!("\n");
    }

    println!("{}", "=".repeat(70));
    println!("Example complete!");

    Ok(())
}
