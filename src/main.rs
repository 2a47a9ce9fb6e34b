//! manuscript - document import tool

use std::process::ExitCode;

use clap::Parser;

use manuscript::{Document, ImportOptions, read_html_fragment, read_odt};

#[derive(Parser)]
#[command(name = "manuscript")]
#[command(version, about = "Import ODT and HTML documents", long_about = None)]
#[command(after_help = "EXAMPLES:
    manuscript paper.odt                Summarize the extracted fields
    manuscript paper.odt --json         Emit the full document as JSON
    manuscript notes.html --content     Print only the normalized markup")]
struct Cli {
    /// Input file (.odt, .html, or .htm)
    #[arg(value_name = "INPUT")]
    input: String,

    /// Emit the full document as JSON
    #[arg(long)]
    json: bool,

    /// Print only the normalized content markup
    #[arg(long)]
    content: bool,

    /// Skip author extraction
    #[arg(long)]
    no_author: bool,

    /// Skip abstract extraction
    #[arg(long)]
    no_abstract: bool,

    /// Skip embedded image extraction
    #[arg(long)]
    no_images: bool,

    /// Omit the trailing footnotes block
    #[arg(long)]
    no_footnotes: bool,

    /// Drop inline formatting wrappers, keeping their text
    #[arg(long)]
    plain: bool,

    /// Most paragraphs the abstract may take
    #[arg(long, value_name = "N", default_value_t = 3)]
    abstract_paragraphs: usize,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let options = ImportOptions {
        auto_extract_author: !cli.no_author,
        auto_extract_abstract: !cli.no_abstract,
        abstract_max_paragraphs: cli.abstract_paragraphs,
        import_images: !cli.no_images,
        import_footnotes: !cli.no_footnotes,
        preserve_formatting: !cli.plain,
    };

    let doc = import(&cli.input, &options).map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
        println!("{json}");
    } else if cli.content {
        println!("{}", doc.content);
    } else {
        show_summary(&cli.input, &doc);
    }

    Ok(())
}

fn import(path: &str, options: &ImportOptions) -> manuscript::Result<Document> {
    let lower = path.to_lowercase();
    if lower.ends_with(".html") || lower.ends_with(".htm") {
        let html = std::fs::read_to_string(path)?;
        read_html_fragment(&html, options)
    } else {
        read_odt(path, options)
    }
}

fn show_summary(path: &str, doc: &Document) {
    println!("File: {path}");
    println!("Title: {}", doc.title);
    if !doc.author.is_empty() {
        println!("Author: {}", doc.author);
    }
    if !doc.abstract_text.is_empty() {
        let text = doc.abstract_text.trim();
        if text.len() > 200 {
            println!("Abstract: {}...", truncate(text, 200));
        } else {
            println!("Abstract: {text}");
        }
    }
    println!("Content bytes: {}", doc.content.len());
    println!("Images: {}", doc.images.len());
    println!("Footnotes: {}", doc.footnotes.len());
}

fn truncate(text: &str, max: usize) -> &str {
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
