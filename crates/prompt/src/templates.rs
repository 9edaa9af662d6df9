//! Built-in prompt templates.
//!
//! Templates are Handlebars strings rendered by the builder. Wording for
//! classification and rephrasing matters: the classifier is told to emit
//! exactly one category id, and the rephraser to emit only the rephrased
//! text, so downstream matching can stay literal.

/// System role for the classification call.
pub const CLASSIFY_SYSTEM: &str = "You are an AI user query classifier that is very \
     experienced. You classify user inputs to one of the provided classes accurately.";

/// Classification prompt. Variables: role, ids, examples, query.
pub const CLASSIFY_TEMPLATE: &str = "Role: {{role}}. \
     Please classify the following query into one of the following categories: {{ids}}. \
     Use the provided examples for accurate classification: {{examples}}. \
     Your response should ONLY be one of the categories provided, with no additional words. \
     Query: {{query}}";

/// Rephrase prompt. Variables: text.
pub const REPHRASE_TEMPLATE: &str = "Rephrase the following text (your response should \
     only have the rephrased text and no additional words): {{text}}";

/// System role for the grounded answer call. Variables: role, sentinel.
pub const ANSWER_SYSTEM_TEMPLATE: &str = "You are a {{role}} answering questions from a \
     reference document.\n\n\
     Instructions:\n\
     - Answer using only the provided context\n\
     - State the facts plainly without referring to the context, documents, or passage numbers\n\
     - If the context does not contain the answer, reply exactly: {{sentinel}}";
