use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use qportal_cli::{init_tracing, regenerate_to_stdout, PreviewTools};

#[derive(Parser, Debug)]
#[command(name = "regenerate_previews")]
#[command(about = "Regenerate PDF previews for existing documents")]
struct Args {
    /// Maximum number of documents to process
    #[arg(long, default_value_t = 10)]
    limit: i64,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    println!("Regenerating PDF previews...");

    let tools = PreviewTools::from_env().await?;

    if !tools.previews.is_available() {
        eprintln!("PDF preview engine is not available (disabled or page import not compiled in).");
        return Ok(ExitCode::FAILURE);
    }
    println!("✓ PDF preview engine is available");

    let documents = tools.repository.list_pdf_documents(args.limit.max(0)).await?;
    if documents.is_empty() {
        println!("No PDF documents found to process.");
        return Ok(ExitCode::SUCCESS);
    }
    println!("Found {} PDF documents to process", documents.len());

    let summary = regenerate_to_stdout(&tools, &documents).await?;

    println!("\nSummary:");
    println!("✓ Successfully processed: {}", summary.succeeded);
    println!("✗ Errors: {}", summary.failed);

    Ok(ExitCode::SUCCESS)
}
