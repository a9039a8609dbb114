//! duckduckgo-cli - search DuckDuckGo from the terminal.

use clap::{Parser, ValueEnum};
use colored::Colorize;
use duckduckgo::{
    Category, DuckDuckGoError, DuckDuckGoResult, SafeSearch, SearchQuery, TimeLimit, VERSION,
    config::{ClientArgs, setup_logging},
    output, prompts, regions,
    tools::search::SearchClient,
    types::DEFAULT_MAX_RESULTS,
};

/// DuckDuckGo search CLI
#[derive(Parser, Debug)]
#[command(
    name = "duckduckgo-cli",
    version = VERSION,
    about = "Search the web with DuckDuckGo",
    long_about = "Search the web with DuckDuckGo and print the results as text or JSON.\n\n\
                  The same searches are available to AI assistants through the duckduckgo-mcp server."
)]
struct Cli {
    /// Search query (multiple words are joined with spaces)
    #[arg(required_unless_present_any = ["list_regions", "list_prompts"])]
    query: Vec<String>,

    /// Maximum number of results (1-50)
    #[arg(short, long, default_value_t = DEFAULT_MAX_RESULTS)]
    max_results: usize,

    /// Region code (e.g., us-en); see --list-regions
    #[arg(short, long, env = "DUCKDUCKGO_REGION")]
    region: Option<String>,

    /// Safe search level
    #[arg(short, long, value_enum, default_value = "off", env = "DUCKDUCKGO_SAFESEARCH")]
    safesearch: SafeSearchOption,

    /// Only return results from the given time window
    #[arg(short, long, value_enum)]
    timelimit: Option<TimeLimitOption>,

    /// Kind of results to search for
    #[arg(short, long, value_enum, default_value = "text")]
    categories: CategoryOption,

    /// Output results as a JSON array
    #[arg(long)]
    json: bool,

    /// Print the supported region codes and exit
    #[arg(long)]
    list_regions: bool,

    /// Print the available prompt templates and exit
    #[arg(long)]
    list_prompts: bool,

    /// Render a prompt template, using the query as its query or topic
    #[arg(long, value_enum, value_name = "NAME")]
    prompt: Option<PromptOption>,

    /// Extra context for the search-assistant prompt
    #[arg(long, requires = "prompt")]
    context: Option<String>,

    /// Depth for the research-planner prompt (basic, intermediate, comprehensive)
    #[arg(long, requires = "prompt")]
    depth: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Disable all logging output
    #[arg(short, long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    #[command(flatten)]
    client: ClientArgs,
}

/// Safe search options
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SafeSearchOption {
    /// Strict filtering
    On,
    /// Moderate filtering
    Moderate,
    /// No filtering
    Off,
}

impl From<SafeSearchOption> for SafeSearch {
    fn from(opt: SafeSearchOption) -> Self {
        match opt {
            SafeSearchOption::On => SafeSearch::On,
            SafeSearchOption::Moderate => SafeSearch::Moderate,
            SafeSearchOption::Off => SafeSearch::Off,
        }
    }
}

/// Time limit options
#[derive(Debug, Clone, Copy, ValueEnum)]
enum TimeLimitOption {
    /// Past day
    #[value(alias = "d")]
    Day,
    /// Past week
    #[value(alias = "w")]
    Week,
    /// Past month
    #[value(alias = "m")]
    Month,
    /// Past year
    #[value(alias = "y")]
    Year,
}

impl From<TimeLimitOption> for TimeLimit {
    fn from(opt: TimeLimitOption) -> Self {
        match opt {
            TimeLimitOption::Day => TimeLimit::Day,
            TimeLimitOption::Week => TimeLimit::Week,
            TimeLimitOption::Month => TimeLimit::Month,
            TimeLimitOption::Year => TimeLimit::Year,
        }
    }
}

/// Category options
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CategoryOption {
    /// Web pages
    Text,
    /// Images
    Images,
    /// Videos
    Videos,
    /// News articles
    News,
}

impl From<CategoryOption> for Category {
    fn from(opt: CategoryOption) -> Self {
        match opt {
            CategoryOption::Text => Category::Text,
            CategoryOption::Images => Category::Images,
            CategoryOption::Videos => Category::Videos,
            CategoryOption::News => Category::News,
        }
    }
}

/// Prompt templates printable from the CLI
#[derive(Debug, Clone, Copy, ValueEnum)]
enum PromptOption {
    /// Analyse search results for a query
    SearchAssistant,
    /// Plan research on a topic
    ResearchPlanner,
}

fn print_error(message: &str, color: bool) {
    if color {
        eprintln!("{} {}", "Error:".red().bold(), message);
    } else {
        eprintln!("Error: {}", message);
    }
}

fn joined_query(words: &[String]) -> String {
    words.join(" ").trim().to_string()
}

fn run_list_regions(json: bool, color: bool) -> DuckDuckGoResult<()> {
    let resource = regions::regions_resource();
    if json {
        println!("{}", serde_json::to_string_pretty(&resource)?);
    } else {
        print!("{}", output::render_regions_text(&resource, color));
    }
    Ok(())
}

fn run_list_prompts(json: bool, color: bool) -> DuckDuckGoResult<()> {
    let definitions = prompts::list_prompts();
    if json {
        println!("{}", serde_json::to_string_pretty(&definitions)?);
    } else {
        print!("{}", output::render_prompts_text(&definitions, color));
    }
    Ok(())
}

fn run_prompt(
    prompt: PromptOption,
    subject: &str,
    context: Option<&str>,
    depth: Option<&str>,
) -> DuckDuckGoResult<()> {
    if subject.is_empty() {
        return Err(DuckDuckGoError::InvalidArguments(
            "a query or topic is required to render a prompt".to_string(),
        ));
    }

    let text = match prompt {
        PromptOption::SearchAssistant => prompts::search_assistant(subject, context),
        PromptOption::ResearchPlanner => {
            prompts::research_planner(subject, depth.unwrap_or("basic"))
        },
    };
    println!("{}", text);
    Ok(())
}

async fn run_search(cli: Cli, color: bool) -> DuckDuckGoResult<()> {
    let query = SearchQuery::new(joined_query(&cli.query))
        .with_max_results(cli.max_results)
        .with_region(cli.region)
        .with_safesearch(cli.safesearch.into())
        .with_timelimit(cli.timelimit.map(Into::into))
        .with_category(cli.categories.into());

    // Reject bad parameters before building a client
    query.validate()?;

    let client = SearchClient::with_config(cli.client.into())?;
    let response = client.search(&query).await?;

    if cli.json {
        println!("{}", output::render_json(&response.results)?);
    } else {
        print!("{}", output::render_text(&response.results, color));
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }
    let color = !cli.no_color && !cli.json;

    setup_logging(cli.verbose, cli.quiet, "warn", false);

    let result = if cli.list_regions {
        run_list_regions(cli.json, color)
    } else if cli.list_prompts {
        run_list_prompts(cli.json, color)
    } else if let Some(prompt) = cli.prompt {
        run_prompt(
            prompt,
            &joined_query(&cli.query),
            cli.context.as_deref(),
            cli.depth.as_deref(),
        )
    } else {
        run_search(cli, color).await
    };

    if let Err(e) = result {
        print_error(&e.to_string(), color);
        std::process::exit(1);
    }
}
