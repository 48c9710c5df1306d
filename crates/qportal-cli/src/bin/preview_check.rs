use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use qportal_cli::{format_bytes, init_tracing, PreviewTools};
use qportal_processing::preview::can_process_with_text_reflow;
use uuid::Uuid;

/// Pages generated for a test preview.
const CHECK_PAGES: u32 = 3;

#[derive(Parser, Debug)]
#[command(name = "preview_check")]
#[command(about = "Check the PDF preview engine and optionally test one document")]
struct Args {
    /// Document to generate a test preview for
    #[arg(value_name = "UUID")]
    document_id: Option<Uuid>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_tracing();
    let args = Args::parse();

    println!("Checking PDF preview engine...");

    let tools = PreviewTools::from_env().await?;
    let capabilities = qportal_processing::capabilities();
    println!(
        "  page import: {}, text reflow: {}",
        yes_no(capabilities.page_import),
        yes_no(capabilities.text_reflow)
    );
    println!(
        "  strategies: {}",
        tools.previews.engine().strategy_names().join(" -> ")
    );

    if !tools.previews.is_available() {
        eprintln!("✗ PDF preview engine is NOT available");
        return Ok(ExitCode::FAILURE);
    }
    println!("✓ PDF preview engine is available");

    let Some(document_id) = args.document_id else {
        return Ok(ExitCode::SUCCESS);
    };

    println!("\nTesting with document ID: {}", document_id);
    let Some(document) = tools.repository.get_document(document_id).await? else {
        eprintln!("✗ Document not found");
        return Ok(ExitCode::FAILURE);
    };

    println!("Document: {}", document.title);
    println!("File path: {}", document.file_path);

    if !tools.storage.exists(&document.file_path).await.unwrap_or(false) {
        eprintln!("✗ Document file not found: {}", document.file_path);
        return Ok(ExitCode::FAILURE);
    }
    println!("✓ Document file exists");

    if let Ok(path) = tools.storage.resolve_path(&document.file_path) {
        println!(
            "  text reflow can parse source: {}",
            yes_no(can_process_with_text_reflow(&path).await)
        );
    }

    println!("Generating preview...");
    if !tools
        .previews
        .generate_document_preview(&document, CHECK_PAGES)
        .await
    {
        eprintln!("✗ Failed to generate preview");
        return Ok(ExitCode::FAILURE);
    }

    match tools.repository.get_document(document_id).await?.and_then(|d| d.preview) {
        Some(preview) => {
            println!("✓ Preview generated successfully");
            println!("  Preview path: {}", preview.path);
            println!("  Preview size: {} bytes", format_bytes(preview.size));
        }
        None => println!("✓ Preview generated, but the document has no preview recorded"),
    }

    Ok(ExitCode::SUCCESS)
}

fn yes_no(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "no"
    }
}
