//! Exercise the concierge without the web server: each tool on its own, then a set of
//! sample questions through the full turn loop.
//!
//! ```sh
//! cargo run --example concierge_smoke
//! ```

use wine_concierge::llm::tools::ToolName;
use wine_concierge::prelude::*;

const SAMPLE_QUESTIONS: &[&str] = &[
    "What wines do you have available?",
    "What are your tasting room hours?",
    "What's the weather like today in Napa?",
    "Tell me about your Cabernet Sauvignon pricing",
    "What are the latest wine trends?",
    "Do you have any events this month?",
    "How much does wine tasting cost?",
];

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = ConciergeConfig::from_env()?;
    let concierge = Concierge::from_config(&config)?;
    println!("Concierge initialized ({} knowledge bytes)", concierge.knowledge().len());

    println!("\nTesting individual tools...\n");
    let checks = [
        ToolRequest::new(ToolName::KnowledgeLookup.as_str()).with_argument("query", "hours"),
        ToolRequest::new(ToolName::WeatherLookup.as_str()).with_argument("location", "Napa, CA"),
        ToolRequest::new(ToolName::WebSearch.as_str())
            .with_argument("query", "Napa Valley wine news")
            .with_argument("max_results", "2"),
    ];
    for result in concierge.dispatcher().execute_all(&checks).await {
        let status = if result.is_success() { "ok" } else { "FAILED" };
        println!("[{}] {}", status, result.tool);
        println!("{}\n", result.model_content());
    }

    println!("Testing sample questions...\n{}", "=".repeat(80));
    for (i, question) in SAMPLE_QUESTIONS.iter().enumerate() {
        println!("\nTest {}/{}", i + 1, SAMPLE_QUESTIONS.len());
        println!("Q: {}", question);
        let reply = concierge.handle_turn(question, vec![]).await;
        println!("A: {}", reply.text);
        println!("   ({:?}, {} tool batches)", reply.outcome, reply.iterations);
        println!("{}", "-".repeat(80));
    }

    Ok(())
}
