use std::io::{self, Write};
use std::process::{Command, Stdio};
use thiserror::Error;

/// Source syntax beyond plain script the compiler must accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxExtension {
    Jsx,
    TypeScript,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    pub extensions: Vec<SyntaxExtension>,
    pub filename: String,
}

impl CompileOptions {
    /// Options for a generated component: JSX and TypeScript under `main.tsx`.
    pub fn component() -> Self {
        Self {
            extensions: vec![SyntaxExtension::Jsx, SyntaxExtension::TypeScript],
            filename: "main.tsx".to_string(),
        }
    }

    fn has(&self, extension: SyntaxExtension) -> bool {
        self.extensions.contains(&extension)
    }

    fn loader(&self) -> &'static str {
        match (
            self.has(SyntaxExtension::Jsx),
            self.has(SyntaxExtension::TypeScript),
        ) {
            (true, true) => "tsx",
            (true, false) => "jsx",
            (false, true) => "ts",
            (false, false) => "js",
        }
    }
}

#[derive(Debug, Error)]
pub enum CompileError {
    /// The source does not compile yet; expected while a fragment is partial.
    #[error("compile failed: {0}")]
    Syntax(String),
    /// The compiler itself cannot be run.
    #[error("compiler unavailable: {0}")]
    Unavailable(String),
}

/// Turns component source into a self-contained script unit.
pub trait Compiler: Send {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError>;
}

/// Pipes the source through an `esbuild` process, one run per call.
#[derive(Debug, Clone)]
pub struct EsbuildCompiler {
    program: String,
}

impl EsbuildCompiler {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn args(options: &CompileOptions) -> Vec<String> {
        vec![
            format!("--loader={}", options.loader()),
            "--jsx=transform".to_string(),
            format!("--sourcefile={}", options.filename),
            "--log-level=error".to_string(),
        ]
    }
}

impl Default for EsbuildCompiler {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_COMPILER)
    }
}

impl Compiler for EsbuildCompiler {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<String, CompileError> {
        let mut child = Command::new(&self.program)
            .args(Self::args(options))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| unavailable(&self.program, e))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(source.as_bytes())
                .map_err(|e| CompileError::Unavailable(format!("{}: {e}", self.program)))?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| CompileError::Unavailable(format!("{}: {e}", self.program)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CompileError::Syntax(stderr.trim().to_string()));
        }

        String::from_utf8(output.stdout)
            .map_err(|e| CompileError::Syntax(format!("compiler produced invalid UTF-8: {e}")))
    }
}

fn unavailable(program: &str, error: io::Error) -> CompileError {
    match error.kind() {
        io::ErrorKind::NotFound => {
            CompileError::Unavailable(format!("`{program}` was not found on PATH"))
        }
        _ => CompileError::Unavailable(format!("failed to start `{program}`: {error}")),
    }
}
