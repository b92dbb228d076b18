use anyhow::{Result, bail};
use clap::{Parser, ValueEnum};
use prompt_flow::OpenRouterModel;
use scholar_chat_service::{
    Complexity, KeywordsState, OrchestrationController, PaperFlows, PaperSubmission, Sender,
    ServiceConfig, SummaryState, read_paper_file,
};
use std::{path::PathBuf, sync::Arc};

/// Summarize a plain-text research paper and ask questions about it.
#[derive(Parser, Debug)]
#[command(name = "ask-paper", author, version, about, long_about = None)]
struct Args {
    /// Plain-text (.txt) paper to load
    file: PathBuf,

    /// Summary complexity
    #[arg(short, long, value_enum, default_value_t = ComplexityArg::Simple)]
    complexity: ComplexityArg,

    /// Summary language
    #[arg(short, long, default_value = "English")]
    language: String,

    /// Question to ask about the paper (repeatable)
    #[arg(short, long = "question")]
    questions: Vec<String>,

    /// Explain answers in very simple terms
    #[arg(long)]
    eli5: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum ComplexityArg {
    Simple,
    Detailed,
}

impl From<ComplexityArg> for Complexity {
    fn from(arg: ComplexityArg) -> Self {
        match arg {
            ComplexityArg::Simple => Complexity::Simple,
            ComplexityArg::Detailed => Complexity::Detailed,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("warn").init();

    let args = Args::parse();
    let config = ServiceConfig::from_env()?;
    let api_key = config.api_key()?;

    let paper = match read_paper_file(&args.file).await {
        Ok(paper) => paper,
        Err(e) => {
            let notice = e.notice();
            bail!("{}: {} ({e})", notice.title, notice.description);
        }
    };

    let model = Arc::new(OpenRouterModel::new(api_key, config.model.clone()));
    let flows = Arc::new(PaperFlows::new(model));
    let session = OrchestrationController::new(flows, config.capabilities);

    println!("Processing {} with {}", paper.name, config.model);

    let submission = PaperSubmission::new(paper.text)
        .with_complexity(args.complexity.into())
        .with_language(args.language);
    if let Err(notice) = session.submit_paper(submission).await {
        bail!("{}: {}", notice.title, notice.description);
    }

    let snapshot = session.snapshot().await;
    match &snapshot.summary {
        SummaryState::Ready { summary } => {
            println!("\nSummary:\n────────\n{summary}");
        }
        SummaryState::Failed { message } => eprintln!("\n{message}"),
        _ => {}
    }

    match &snapshot.keywords {
        KeywordsState::Ready { keywords } => println!("\nKeywords: {}", keywords.join(", ")),
        KeywordsState::Empty | KeywordsState::Failed => println!("\nKeywords: (none)"),
        _ => {}
    }

    for question in &args.questions {
        if let Err(notice) = session.send_message(question, args.eli5).await {
            bail!("Could not ask {question:?}: {}", notice.description);
        }
    }

    let snapshot = session.snapshot().await;
    for message in &snapshot.chat_history {
        match message.sender {
            Sender::User => println!("\nQ: {}", message.text),
            Sender::Ai => println!("A: {}", message.text),
        }
    }

    for notice in session.drain_notices().await {
        if notice.is_destructive() {
            eprintln!("! {}: {}", notice.title, notice.description);
        }
    }

    Ok(())
}
