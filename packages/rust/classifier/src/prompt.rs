//! Prompt construction for the coding request.

use transcoder_shared::Category;

/// Lead-in for the user message; the chunk text follows it.
const USER_PREAMBLE: &str = "Identify exact quotations from this transcript and map them \
to the categories. Only include verbatim matches. Transcript:\n\n";

/// System prompt: analyst role, response schema, verbatim rule, taxonomy.
pub fn system_prompt() -> String {
    let mut prompt = String::from(
        "You are an analyst that codes interview transcripts into the\n\
         specified categories. Return JSON following this schema:\n\
         \n\
         {\n  \"matches\": [\n    {\n      \"category\": \"A\",\n      \
         \"quotes\": [\"verbatim excerpt\"]\n    }\n  ]\n}\n\
         \n\
         Only output text that exists verbatim in the transcript. DO NOT paraphrase or\n\
         rewrite any text. Use the categories:\n\n",
    );

    let categories: String = Category::ALL
        .iter()
        .map(|c| format!("{}. {} – {}\n", c.code(), c.title(), c.description()))
        .collect();
    prompt.push_str(&categories);

    prompt
}

/// User message wrapping one chunk of transcript text.
pub fn user_prompt(chunk: &str) -> String {
    format!("{USER_PREAMBLE}{chunk}")
}
