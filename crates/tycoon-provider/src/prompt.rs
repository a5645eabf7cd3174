//! Prompt template loading and rendering via `minijinja`.
//!
//! Four templates drive the provider: a system and user message for task
//! generation, and a system and user message for answer verification.
//! A built-in set is compiled into the binary; operators can point
//! `llm.templates_dir` at a directory holding the same four files to tune
//! wording without recompiling.

use std::path::Path;

use minijinja::{Environment, context};

use crate::error::ProviderError;

/// Template file names, in the order they are registered.
const TEMPLATE_NAMES: [&str; 4] = [
    "generate_system",
    "generate_user",
    "verify_system",
    "verify_user",
];

const BUILTIN_GENERATE_SYSTEM: &str = include_str!("../templates/generate_system.j2");
const BUILTIN_GENERATE_USER: &str = include_str!("../templates/generate_user.j2");
const BUILTIN_VERIFY_SYSTEM: &str = include_str!("../templates/verify_system.j2");
const BUILTIN_VERIFY_USER: &str = include_str!("../templates/verify_user.j2");

/// How the backend should shape its reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseFormat {
    /// Structured JSON (backends with a JSON mode enable it).
    Json,
    /// Free text.
    Text,
}

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone)]
pub struct RenderedPrompt {
    /// System message describing the role.
    pub system: String,
    /// User message with the concrete request.
    pub user: String,
    /// Expected reply shape.
    pub format: ResponseFormat,
}

/// Manages prompt template loading and rendering.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Create an engine with the templates compiled into the crate.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Template`] if a built-in template fails to
    /// compile.
    pub fn builtin() -> Result<Self, ProviderError> {
        let sources = [
            BUILTIN_GENERATE_SYSTEM,
            BUILTIN_GENERATE_USER,
            BUILTIN_VERIFY_SYSTEM,
            BUILTIN_VERIFY_USER,
        ];
        let mut env = Environment::new();
        for (name, source) in TEMPLATE_NAMES.into_iter().zip(sources) {
            env.add_template(name, source).map_err(|e| {
                ProviderError::Template(format!("failed to add {name} template: {e}"))
            })?;
        }
        Ok(Self { env })
    }

    /// Create an engine loading `<name>.j2` files from a directory.
    ///
    /// The directory must contain `generate_system.j2`, `generate_user.j2`,
    /// `verify_system.j2` and `verify_user.j2`.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Template`] if a file is missing or does not
    /// compile.
    pub fn from_dir(templates_dir: &Path) -> Result<Self, ProviderError> {
        let mut env = Environment::new();
        for name in TEMPLATE_NAMES {
            let source = load_template(templates_dir, name)?;
            env.add_template_owned(name, source).map_err(|e| {
                ProviderError::Template(format!("failed to add {name} template: {e}"))
            })?;
        }
        Ok(Self { env })
    }

    /// Render the task generation prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Template`] if rendering fails.
    pub fn render_generation(
        &self,
        level: u32,
        count: u32,
        language: &str,
    ) -> Result<RenderedPrompt, ProviderError> {
        let ctx = context! { level, count, language };
        Ok(RenderedPrompt {
            system: self.render("generate_system", &ctx)?,
            user: self.render("generate_user", &ctx)?,
            format: ResponseFormat::Json,
        })
    }

    /// Render the answer verification prompt.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Template`] if rendering fails.
    pub fn render_verification(
        &self,
        challenge: &str,
        expected: &str,
        answer: &str,
    ) -> Result<RenderedPrompt, ProviderError> {
        let ctx = context! { challenge, expected, answer };
        Ok(RenderedPrompt {
            system: self.render("verify_system", &ctx)?,
            user: self.render("verify_user", &ctx)?,
            format: ResponseFormat::Text,
        })
    }

    fn render(&self, name: &str, ctx: &minijinja::Value) -> Result<String, ProviderError> {
        self.env
            .get_template(name)
            .map_err(|e| ProviderError::Template(format!("missing {name} template: {e}")))?
            .render(ctx)
            .map_err(|e| ProviderError::Template(format!("{name} render failed: {e}")))
    }
}

/// Read a template file from disk.
fn load_template(dir: &Path, name: &str) -> Result<String, ProviderError> {
    let path = dir.join(format!("{name}.j2"));
    std::fs::read_to_string(&path).map_err(|e| {
        ProviderError::Template(format!("failed to read {}: {e}", path.display()))
    })
}
