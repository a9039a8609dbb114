//! Prompt templates exposed over MCP and printable from the CLI.

use crate::types::{DuckDuckGoError, DuckDuckGoResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Name of the search analysis prompt
pub const SEARCH_ASSISTANT: &str = "search_assistant";

/// Name of the research planning prompt
pub const RESEARCH_PLANNER: &str = "research_planner";

/// Placeholder the client replaces with actual results
pub const RESULTS_PLACEHOLDER: &str = "[SEARCH_RESULTS]";

/// Argument of an MCP prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptArgument {
    /// Argument name
    pub name: String,

    /// What the argument is for
    pub description: String,

    /// Whether the client must provide it
    pub required: bool,
}

/// MCP prompt definition
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Prompt name
    pub name: String,

    /// Prompt description
    pub description: String,

    /// Accepted arguments
    pub arguments: Vec<PromptArgument>,
}

/// How many questions a research plan should cover
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResearchDepth {
    /// A handful of key questions
    Basic,
    /// A focused set of questions
    Intermediate,
    /// A detailed breakdown
    Comprehensive,
}

impl ResearchDepth {
    /// Parse a depth name. Unknown names yield `None`.
    pub fn parse(depth: &str) -> Option<Self> {
        match depth.trim().to_lowercase().as_str() {
            "basic" => Some(ResearchDepth::Basic),
            "intermediate" => Some(ResearchDepth::Intermediate),
            "comprehensive" => Some(ResearchDepth::Comprehensive),
            _ => None,
        }
    }

    fn questions(&self) -> &'static str {
        match self {
            ResearchDepth::Basic => "3-5 key questions",
            ResearchDepth::Intermediate => "5-8 focused questions",
            ResearchDepth::Comprehensive => "8-12 detailed questions",
        }
    }
}

/// Prompt asking an assistant to analyse search results for `query`
pub fn search_assistant(query: &str, context: Option<&str>) -> String {
    let mut prompt = format!(
        "I need you to help me analyze search results for the query: \"{query}\"\n\
         \n\
         Please examine the following search results and provide insights about:\n\
         1. The most relevant and authoritative sources\n\
         2. Key information and facts from the results\n\
         3. Any patterns or trends in the information\n\
         4. Potential biases or limitations in the results\n\
         5. Recommendations for follow-up searches if needed\n\
         \n"
    );

    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        prompt.push_str(&format!("\nAdditional context: {context}\n\n"));
    }

    prompt.push_str("Search Results:\n");
    prompt.push_str(RESULTS_PLACEHOLDER);
    prompt
}

/// Prompt asking an assistant to break `topic` into searchable questions
///
/// Unknown depths fall back to the basic question count, but the given
/// depth is still echoed back.
pub fn research_planner(topic: &str, depth: &str) -> String {
    let questions = ResearchDepth::parse(depth)
        .unwrap_or(ResearchDepth::Basic)
        .questions();

    format!(
        "I need to research the topic: \"{topic}\"\n\
         \n\
         Please help me create a structured research plan. \
         Break this topic down into {questions} that I should search for.\n\
         \n\
         For each question, suggest:\n\
         1. Specific search queries to use\n\
         2. What type of information I'm looking for\n\
         3. How the results will contribute to understanding the overall topic\n\
         \n\
         Organize the research plan logically, starting with foundational questions\n\
         and building to more complex analysis.\n\
         \n\
         Topic: {topic}\n\
         Research Depth: {depth}\n"
    )
}

fn argument(name: &str, description: &str, required: bool) -> PromptArgument {
    PromptArgument {
        name: name.to_string(),
        description: description.to_string(),
        required,
    }
}

/// Prompt definitions advertised by `prompts/list`
pub fn list_prompts() -> Vec<PromptDefinition> {
    vec![
        PromptDefinition {
            name: SEARCH_ASSISTANT.to_string(),
            description: "Generate a search assistant prompt for analyzing search results."
                .to_string(),
            arguments: vec![
                argument("query", "The search query", true),
                argument(
                    "context",
                    "Additional context about what the user is looking for",
                    false,
                ),
            ],
        },
        PromptDefinition {
            name: RESEARCH_PLANNER.to_string(),
            description:
                "Generate a research planning prompt for comprehensive topic exploration."
                    .to_string(),
            arguments: vec![
                argument("topic", "The research topic", true),
                argument(
                    "depth",
                    "Research depth level (basic, intermediate, comprehensive)",
                    false,
                ),
            ],
        },
    ]
}

/// Look up a prompt definition by name
pub fn find_prompt(name: &str) -> Option<PromptDefinition> {
    list_prompts().into_iter().find(|p| p.name == name)
}

fn string_arg<'a>(arguments: &'a Map<String, Value>, name: &str) -> Option<&'a str> {
    arguments.get(name).and_then(Value::as_str)
}

fn required_arg<'a>(
    arguments: &'a Map<String, Value>,
    prompt: &str,
    name: &str,
) -> DuckDuckGoResult<&'a str> {
    string_arg(arguments, name).ok_or_else(|| {
        DuckDuckGoError::InvalidArguments(format!(
            "prompt '{}' requires the '{}' argument",
            prompt, name
        ))
    })
}

/// Render a prompt by name from MCP-style string arguments
pub fn render_prompt(name: &str, arguments: &Map<String, Value>) -> DuckDuckGoResult<String> {
    match name {
        SEARCH_ASSISTANT => {
            let query = required_arg(arguments, name, "query")?;
            Ok(search_assistant(query, string_arg(arguments, "context")))
        },
        RESEARCH_PLANNER => {
            let topic = required_arg(arguments, name, "topic")?;
            let depth = string_arg(arguments, "depth").unwrap_or("basic");
            Ok(research_planner(topic, depth))
        },
        _ => Err(DuckDuckGoError::NotFound(format!("prompt '{}'", name))),
    }
}
