//! Rendering of results, regions and prompts for terminal output.

use crate::prompts::PromptDefinition;
use crate::regions::RegionsResource;
use crate::types::{DuckDuckGoResult, SearchResult};
use colored::Colorize;
use std::fmt::Write;

/// Characters of the body shown per result in text output
pub const BODY_PREVIEW_LENGTH: usize = 200;

/// Message printed when a search yields nothing
pub const NO_RESULTS: &str = "No results found.";

/// Truncate `body` to [`BODY_PREVIEW_LENGTH`] characters, marking the cut with `...`
pub fn body_preview(body: &str) -> String {
    let mut chars = body.chars();
    let preview: String = chars.by_ref().take(BODY_PREVIEW_LENGTH).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Numbered, human-readable listing of results
pub fn render_text(results: &[SearchResult], color: bool) -> String {
    if results.is_empty() {
        return format!("{}\n", NO_RESULTS);
    }

    let mut out = String::new();
    for (i, result) in results.iter().enumerate() {
        let body = body_preview(&result.body);
        if color {
            let _ = writeln!(
                out,
                "{} {}",
                format!("{}.", i + 1).bright_black(),
                result.title.white().bold()
            );
            let _ = writeln!(
                out,
                "   {} {}",
                "URL:".bright_black(),
                result.url.bright_blue().underline()
            );
            let _ = writeln!(out, "   {}", body);
        } else {
            let _ = writeln!(out, "{}. {}", i + 1, result.title);
            let _ = writeln!(out, "   URL: {}", result.url);
            let _ = writeln!(out, "   {}", body);
        }
        out.push('\n');
    }
    out
}

/// Pretty JSON array of `{title, url, body}` records
pub fn render_json(results: &[SearchResult]) -> DuckDuckGoResult<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Two-column listing of region codes
pub fn render_regions_text(resource: &RegionsResource, color: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", resource.note);
    let _ = writeln!(out, "{} regions:\n", resource.count);

    for region in &resource.regions {
        if color {
            let _ = writeln!(out, "  {:<8} {}", region.code.cyan(), region.name);
        } else {
            let _ = writeln!(out, "  {:<8} {}", region.code, region.name);
        }
    }
    out
}

/// Listing of prompt names, descriptions and arguments
pub fn render_prompts_text(prompts: &[PromptDefinition], color: bool) -> String {
    let mut out = String::new();

    for prompt in prompts {
        if color {
            let _ = writeln!(out, "{} {}", prompt.name.green(), prompt.description.bright_black());
        } else {
            let _ = writeln!(out, "{} - {}", prompt.name, prompt.description);
        }

        for arg in &prompt.arguments {
            let marker = if arg.required { "required" } else { "optional" };
            let _ = writeln!(out, "    {} ({}): {}", arg.name, marker, arg.description);
        }
    }
    out
}
