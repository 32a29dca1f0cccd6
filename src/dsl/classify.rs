//! Whole-document classification.
//!
//! A model file declares `connection:`, `include:`, and `explore:` at column
//! zero with no enclosing braces. Those statements need a model to attach to,
//! so classification runs before the line walk and decides whether an
//! implicit model exists and what it is called.

use rand::Rng;

/// Suffixes that mark a model file by name alone.
pub const DEFAULT_MODEL_FILE_SUFFIXES: &[&str] = &[".model.lkml", ".model.lookml"];

const FALLBACK_NAME_LEN: usize = 7;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Inputs to document classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Identifier suffixes that mark a model file.
    pub model_file_suffixes: Vec<String>,
    /// Also treat documents containing `connection:`/`include:` statements
    /// as model files.
    pub detect_by_content: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            model_file_suffixes: DEFAULT_MODEL_FILE_SUFFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            detect_by_content: true,
        }
    }
}

impl ParseOptions {
    /// The suffix of `identifier` that marks it as a model file, if any.
    pub fn model_suffix<'a>(&'a self, identifier: &str) -> Option<&'a str> {
        self.model_file_suffixes
            .iter()
            .find(|suffix| identifier.ends_with(suffix.as_str()))
            .map(String::as_str)
    }
}

/// Outcome of classifying a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentClass {
    pub is_model_file: bool,
    /// Name of the implicit model. `Some` exactly when `is_model_file`.
    pub model_name: Option<String>,
}

/// Classify a document by its identifier and contents.
pub fn classify(identifier: &str, text: &str, options: &ParseOptions) -> DocumentClass {
    let by_name = options.model_suffix(identifier).is_some();
    let is_model_file = by_name || (options.detect_by_content && declares_model_statements(text));

    if !is_model_file {
        return DocumentClass {
            is_model_file,
            model_name: None,
        };
    }

    let model_name = model_name_from_identifier(identifier, options).unwrap_or_else(|| {
        let name = fallback_model_name();
        tracing::debug!(identifier, name = %name, "model file name not derivable, using fallback");
        name
    });

    DocumentClass {
        is_model_file,
        model_name: Some(model_name),
    }
}

/// Whether any line is a `connection:` or `include:` statement.
fn declares_model_statements(text: &str) -> bool {
    text.lines().any(|line| {
        let line = line.trim_start();
        line.starts_with("connection:") || line.starts_with("include:")
    })
}

/// The file stem before the model suffix: `/p/ecommerce.model.lkml` -> `ecommerce`.
pub fn model_name_from_identifier(identifier: &str, options: &ParseOptions) -> Option<String> {
    let suffix = options.model_suffix(identifier)?;
    let file_name = identifier.rsplit(['/', '\\']).next()?;
    let stem = file_name.strip_suffix(suffix)?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}

/// A display name for a model file whose name cannot be derived.
///
/// Not a stable key: two documents can collide, and the name changes on
/// every parse.
pub fn fallback_model_name() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..FALLBACK_NAME_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    format!("model_{}", suffix)
}
