//! Render templates against JSON input

use std::io::{Read, Write};

use tracing::debug;

use super::CliError;
use crate::{FunctionMap, MissingKeyPolicy, Template, Value, convert::json_to_value};

/// Options for the render command
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Template source
    pub template: String,
    /// JSON input: zero or more whitespace-separated documents
    pub input: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Fail on missing keys instead of rendering null
    pub strict: bool,
    /// Only compile the template, don't render
    pub syntax_only: bool,
}

impl RenderOptions {
    fn policy(&self) -> MissingKeyPolicy {
        if self.strict {
            MissingKeyPolicy::ErrorOnMissing
        } else {
            MissingKeyPolicy::NullOnMissing
        }
    }

    /// Compiles the template with the standard functions available.
    pub fn compile(&self) -> Result<Template, CliError> {
        let template = Template::compile(&self.template, &FunctionMap::builtins())?;
        Ok(template.with_missing_keys(self.policy()))
    }
}

/// Result of a render operation
#[derive(Debug)]
pub enum RenderResult {
    /// The template compiled
    SyntaxValid,
    /// One rendered value per input document
    Success(Vec<Value>),
}

/// Compile the template and render every document of the input
pub fn execute_render(options: &RenderOptions) -> Result<RenderResult, CliError> {
    let template = options.compile()?;

    if options.syntax_only {
        return Ok(RenderResult::SyntaxValid);
    }

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;

    let mut outputs = Vec::new();
    for document in serde_json::Deserializer::from_str(input).into_iter::<serde_json::Value>() {
        let value = json_to_value(document?);
        outputs.push(template.render(&value)?);
    }
    debug!(documents = outputs.len(), "rendered input");
    Ok(RenderResult::Success(outputs))
}

/// Render documents from `reader` one at a time, writing one compact line
/// per document. Returns how many documents were rendered.
pub fn stream_render<R: Read, W: Write>(
    template: &Template,
    mut reader: R,
    mut writer: W,
) -> Result<usize, CliError> {
    let mut count = 0;
    while template.render_json(&mut writer, &mut reader)? {
        count += 1;
    }
    writer.flush()?;
    Ok(count)
}
