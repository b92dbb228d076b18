//! The notices shown to the user for each operation outcome.

use crate::models::Notice;

pub fn empty_paper() -> Notice {
    Notice::destructive("Error", "Paper content cannot be empty.")
}

pub fn summary_generated() -> Notice {
    Notice::info("Summary Generated!", "The paper has been summarized successfully.")
}

pub fn summarization_failed() -> Notice {
    Notice::destructive(
        "Summarization Failed",
        "Could not summarize the paper. Please try again.",
    )
}

pub fn keywords_extracted() -> Notice {
    Notice::info("Keywords Extracted!", "Relevant keywords have been identified.")
}

pub fn no_keywords_found() -> Notice {
    Notice::info(
        "No Keywords Found",
        "Could not extract distinct keywords from this paper.",
    )
}

pub fn keyword_extraction_failed() -> Notice {
    Notice::destructive(
        "Keyword Extraction Failed",
        "Could not extract keywords from the paper.",
    )
}

pub fn no_paper_loaded() -> Notice {
    Notice::destructive(
        "No Paper Loaded",
        "Please upload and process a paper first.",
    )
}

pub fn empty_question() -> Notice {
    Notice::destructive("Empty Question", "Please type a question before sending.")
}

pub fn chat_error() -> Notice {
    Notice::destructive("Chat Error", "Could not get an answer. Please try again.")
}

pub fn cleared() -> Notice {
    Notice::info("Cleared", "All content has been cleared.")
}

pub fn invalid_file(description: &str) -> Notice {
    Notice::destructive("Invalid File Type", description)
}
