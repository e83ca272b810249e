use std::io::{Read, Write};

use tracing::debug;

use crate::{
    builder::{Builder, CompileError},
    convert::json_to_value,
    error::{Error, Result},
    evaluator::{EvalError, MissingKeyPolicy},
    function::FunctionMap,
    node::Node,
    output::to_json,
    parser,
    value::Value,
};

/// A compiled transformation from one JSON-like structure to another.
///
/// Templates are immutable once compiled apart from their
/// [`MissingKeyPolicy`], and can be rendered any number of times, from any
/// number of threads.
///
/// # Examples
///
/// ```
/// use jsontemplate::{FunctionMap, Template, Value};
///
/// let template = Template::compile(
///     r#"{ "CamelCase": $.snakeCase }"#,
///     &FunctionMap::new(),
/// ).unwrap();
///
/// let mut out = Vec::new();
/// template.render_json(&mut out, r#"{ "snakeCase": 123 }"#.as_bytes()).unwrap();
/// assert_eq!(String::from_utf8(out).unwrap(), "{\"CamelCase\":123}\n");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    root: Node,
    missing_keys: MissingKeyPolicy,
}

impl Template {
    /// Compiles template source, resolving function calls against
    /// `functions`.
    ///
    /// The source is a JSON value extended with queries (`$.path`),
    /// generators (`range $.path [ ... ]`), function calls (`name(...)`),
    /// field annotations (`@label "key": ...`), `#` comments and trailing
    /// commas. Plain JSON is a valid template that ignores its input.
    pub fn compile(source: &str, functions: &FunctionMap) -> Result<Template, CompileError> {
        let ast = parser::parse(source)?;
        let root = Builder::new(functions).build(ast)?;
        debug!(source_len = source.len(), "compiled template");
        Ok(Template::from_node(root))
    }

    /// Like [`Template::compile`], reading the source from `reader`.
    pub fn compile_reader<R: Read>(mut reader: R, functions: &FunctionMap) -> Result<Template> {
        let mut source = String::new();
        reader.read_to_string(&mut source)?;
        Ok(Template::compile(&source, functions)?)
    }

    /// Wraps an already built node tree.
    pub fn from_node(root: Node) -> Template {
        Template {
            root,
            missing_keys: MissingKeyPolicy::default(),
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn missing_keys(&self) -> MissingKeyPolicy {
        self.missing_keys
    }

    pub fn set_missing_keys(&mut self, policy: MissingKeyPolicy) {
        self.missing_keys = policy;
    }

    pub fn with_missing_keys(mut self, policy: MissingKeyPolicy) -> Self {
        self.missing_keys = policy;
        self
    }

    /// Renders the template with `input` as the data queries read from.
    pub fn render(&self, input: &Value) -> Result<Value, EvalError> {
        self.render_with(input, self.missing_keys)
    }

    /// Renders with a one-off missing-key policy instead of the template's.
    pub fn render_with(&self, input: &Value, policy: MissingKeyPolicy) -> Result<Value, EvalError> {
        self.root.evaluate(input, policy)
    }

    /// Reads one JSON document from `input`, renders it and writes the result
    /// as compact JSON followed by a newline.
    ///
    /// Returns `Ok(false)` without writing anything when `input` holds nothing
    /// but whitespace, so a stream of whitespace-delimited documents can be
    /// transformed by calling this in a loop until it returns `false`.
    pub fn render_json<W: Write, R: Read>(&self, mut out: W, input: R) -> Result<bool> {
        let mut documents =
            serde_json::Deserializer::from_reader(input).into_iter::<serde_json::Value>();
        let document = match documents.next() {
            None => {
                debug!("end of input stream");
                return Ok(false);
            }
            Some(document) => document.map_err(Error::Decode)?,
        };

        let output = self.render(&json_to_value(document))?;
        writeln!(out, "{}", to_json(&output))?;
        debug!("rendered document");
        Ok(true)
    }
}
