//! Multi-Tool Agent Example
//!
//! Demonstrates a realistic agent wired with multiple tools, safety hooks,
//! and the client's built-in recursive tool-use driver.
//!
//! This agent can:
//! - Perform calculations
//! - Get current date/time
//! - Convert units
//! - Search (mock)
//! - Format data
//!
//! Usage:
//!   cargo run --example multi_tool_agent
//!
//! Requires `ANTHROPIC_API_KEY` to be set.

use futures::StreamExt;
use prism_stream::{tool, AgentOptions, Client, HookDecision, Hooks, PostToolUseEvent, PreToolUseEvent};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "=".repeat(70));
    println!("MULTI-TOOL AGENT DEMO");
    println!("Realistic agent with 5+ tools, hooks, and recursive tool-use");
    println!("{}", "=".repeat(70));
    println!();

    let execution_log = Arc::new(Mutex::new(Vec::new()));

    let calculator = tool("calculate", "Perform arithmetic")
        .param("operation", "string")
        .param("a", "number")
        .param("b", "number")
        .build(|args| async move {
            let op = args["operation"].as_str().unwrap_or("");
            let a = args["a"].as_f64().unwrap_or(0.0);
            let b = args["b"].as_f64().unwrap_or(0.0);

            let result = match op {
                "add" => a + b,
                "subtract" => a - b,
                "multiply" => a * b,
                "divide" => {
                    if b == 0.0 {
                        return Err(prism_stream::Error::tool("Division by zero"));
                    }
                    a / b
                }
                _ => return Err(prism_stream::Error::tool("Unknown operation")),
            };

            Ok(json!({"result": result, "operation": op}))
        });

    let datetime = tool("get_datetime", "Get current date and time")
        .param("format", "string")
        .build(|args| async move {
            let format = args["format"].as_str().unwrap_or("unix");
            let now = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_secs();

            let formatted = match format {
                "unix" => now.to_string(),
                _ => format!("Unix timestamp: {now}"),
            };

            Ok(json!({"datetime": formatted, "format": format}))
        });

    let converter = tool("convert_units", "Convert between units")
        .param("value", "number")
        .param("from_unit", "string")
        .param("to_unit", "string")
        .build(|args| async move {
            let value = args["value"].as_f64().unwrap_or(0.0);
            let from = args["from_unit"].as_str().unwrap_or("");
            let to = args["to_unit"].as_str().unwrap_or("");

            let result = match (from, to) {
                ("km", "miles") => value * 0.621371,
                ("miles", "km") => value / 0.621371,
                ("kg", "lbs") => value * 2.20462,
                ("lbs", "kg") => value / 2.20462,
                ("celsius", "fahrenheit") => (value * 9.0 / 5.0) + 32.0,
                ("fahrenheit", "celsius") => (value - 32.0) * 5.0 / 9.0,
                _ => return Err(prism_stream::Error::tool("Unsupported conversion")),
            };

            Ok(json!({
                "result": result,
                "from": from,
                "to": to,
                "original_value": value
            }))
        });

    let search = tool("search", "Search for information")
        .param("query", "string")
        .build(|args| async move {
            let query = args["query"].as_str().unwrap_or("");

            Ok(json!({
                "results": [
                    {"title": format!("Result for: {}", query), "relevance": 0.95},
                    {"title": "Related information", "relevance": 0.80},
                ],
                "query": query
            }))
        });

    let formatter = tool("format_data", "Format data as table/list")
        .param("data", "object")
        .param("format", "string")
        .build(|args| async move {
            let format = args["format"].as_str().unwrap_or("list");

            Ok(json!({
                "formatted": format!("Data formatted as: {format}"),
                "format": format
            }))
        });

    let log_clone = execution_log.clone();
    let hooks = Hooks::new()
        .add_pre_tool_use(|event: PreToolUseEvent| async move {
            println!("🔍 PreToolUse: {}", event.tool_name);

            if event.tool_name == "delete" || event.tool_name == "modify_system" {
                println!("   🛑 BLOCKED: Dangerous operation");
                return Some(HookDecision::block("Safety policy violation"));
            }

            if event.tool_name == "calculate" {
                if let Some("divide") = event.tool_input.get("operation").and_then(|v| v.as_str())
                    && let Some(0.0) = event.tool_input.get("b").and_then(|v| v.as_f64())
                {
                    println!("   🛑 BLOCKED: Division by zero");
                    return Some(HookDecision::block("Division by zero prevented"));
                }
            }

            println!("   ✅ Allowed");
            Some(HookDecision::continue_())
        })
        .add_post_tool_use(move |event: PostToolUseEvent| {
            let log = log_clone.clone();
            async move {
                println!("✨ PostToolUse: {} completed", event.tool_name);

                let timestamp = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap()
                    .as_secs();

                log.lock().unwrap().push(format!(
                    "[{timestamp}] {} -> {}",
                    event.tool_name,
                    serde_json::to_string(&event.tool_result).unwrap_or_default()
                ));

                None
            }
        });

    let options = AgentOptions::builder()
        .system_prompt(
            "You are a helpful multi-tool assistant. You have access to: \
             calculator, datetime, unit converter, search, and data formatter. \
             Use these tools to help answer questions. \
             Always use tools for calculations and conversions.",
        )
        .model("claude-3-5-sonnet-20241022")
        .api_key(std::env::var("ANTHROPIC_API_KEY").unwrap_or_default())
        .tool(calculator)
        .tool(datetime)
        .tool(converter)
        .tool(search)
        .tool(formatter)
        .hooks(hooks)
        .max_steps(10)
        .temperature(0.3)
        .build()?;

    let mut client = Client::new(options)?;

    println!("Agent configured with:");
    println!("- 5 tools: calculator, datetime, converter, search, formatter");
    println!("- Recursive tool-use: up to 10 hops");
    println!("- Hooks: PreToolUse (safety), PostToolUse (logging)");
    println!();
    println!("{}", "-".repeat(70));
    println!();

    let queries = [
        "What's 15 kilometers in miles?",
        "Calculate 25 divided by 5, then multiply by 3",
        "What's the current Unix timestamp?",
        "Search for information about Rust programming",
    ];

    for (i, query) in queries.iter().enumerate() {
        println!("Query {}: {query}", i + 1);
        println!();

        let mut stream = client.send(query).await?;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            if let Some(text) = chunk.text {
                print!("{text}");
            }
        }
        println!();

        println!();
        println!("{}", "-".repeat(70));
        println!();
    }

    println!("Execution Log:");
    println!("{}", "=".repeat(70));
    for entry in execution_log.lock().unwrap().iter() {
        println!("{entry}");
    }
    println!("{}", "=".repeat(70));
    println!();

    let history = client.history().await;
    println!("Conversation History: {} messages", history.len());
    println!();

    println!("History breakdown:");
    for (i, msg) in history.iter().enumerate() {
        println!("  {}. {:?} - {} content blocks", i + 1, msg.role, msg.content.len());
    }
    println!();

    println!("{}", "=".repeat(70));
    println!("DEMO COMPLETE");
    println!("{}", "=".repeat(70));
    println!();
    println!("Key Features Demonstrated:");
    println!("✅ Multiple specialized tools working together");
    println!("✅ Automatic recursive tool-use (no manual loop driving)");
    println!("✅ PreToolUse hooks (safety validation)");
    println!("✅ PostToolUse hooks (logging)");
    println!("✅ Error handling (division by zero prevention)");
    println!("✅ Comprehensive conversation history tracking");
    println!();
    println!("This example shows a production-ready agent configuration!");
    println!("{}", "=".repeat(70));

    Ok(())
}
