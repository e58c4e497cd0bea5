use super::compiler::{CompileError, CompileOptions, Compiler};
use super::debounce::Debouncer;
use super::element::ElementNode;
use super::extract::extract_fragment;
use super::scope::AmbientRegistry;
use super::script::{evaluate_component, MountError};
use super::target::PreviewRegion;
use super::transform::strip_module_syntax;
use crate::types::ContentKind;
use std::fmt;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Expected while the fragment is still partial; the next increment may fix it.
    Transient,
    /// Retrying cannot help until the environment changes.
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderStage {
    Compile,
    Evaluate,
}

impl fmt::Display for RenderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderStage::Compile => write!(f, "compile"),
            RenderStage::Evaluate => write!(f, "evaluate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub class: FailureClass,
    pub stage: RenderStage,
    pub message: String,
}

impl From<CompileError> for RenderFailure {
    fn from(error: CompileError) -> Self {
        let class = match error {
            CompileError::Syntax(_) => FailureClass::Transient,
            CompileError::Unavailable(_) => FailureClass::Fatal,
        };
        Self {
            class,
            stage: RenderStage::Compile,
            message: error.to_string(),
        }
    }
}

impl From<MountError> for RenderFailure {
    fn from(error: MountError) -> Self {
        let class = match error {
            MountError::Evaluation(_) | MountError::MissingComponent => FailureClass::Transient,
            MountError::InvalidTree(_) => FailureClass::Fatal,
        };
        Self {
            class,
            stage: RenderStage::Evaluate,
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub attempts: usize,
    pub mounts: usize,
    pub transient_failures: usize,
    pub fatal_failures: usize,
}

/// Turns the accumulated response into preview content.
///
/// Markup fragments are applied as soon as they change. Component fragments
/// go through a debounce window and then strip, compile, evaluate and mount;
/// any failure on that path is recorded here and the previous mount stays.
pub struct RenderPipeline {
    kind: ContentKind,
    compiler: Box<dyn Compiler>,
    registry: AmbientRegistry,
    options: CompileOptions,
    debouncer: Debouncer<String>,
    region: PreviewRegion,
    fragment: Option<String>,
    mounted_source: Option<String>,
    stats: RenderStats,
    fatal: Vec<RenderFailure>,
}

impl RenderPipeline {
    pub fn new(kind: ContentKind, compiler: Box<dyn Compiler>, debounce: Duration) -> Self {
        Self {
            kind,
            compiler,
            registry: AmbientRegistry::standard(),
            options: CompileOptions::component(),
            debouncer: Debouncer::new(debounce),
            region: PreviewRegion::new(),
            fragment: None,
            mounted_source: None,
            stats: RenderStats::default(),
            fatal: Vec::new(),
        }
    }

    pub fn with_registry(mut self, registry: AmbientRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Switches content kind, releasing the render target.
    pub fn set_kind(&mut self, kind: ContentKind) {
        if kind == self.kind {
            return;
        }
        log::debug!("preview kind {} -> {}", self.kind, kind);
        self.kind = kind;
        self.clear();
    }

    /// Forgets the current fragment and any pending mount attempt.
    pub fn reset(&mut self) {
        self.debouncer.cancel();
        self.fragment = None;
    }

    /// Forgets everything including the mounted output.
    pub fn clear(&mut self) {
        self.reset();
        self.region.release();
        self.mounted_source = None;
    }

    /// Re-extracts `text` and reacts if the fragment changed.
    pub fn on_text_changed(&mut self, text: &str, now: Instant) {
        let fragment = extract_fragment(text, self.kind);
        if fragment == self.fragment {
            return;
        }
        self.fragment = fragment;

        let fragment = self.fragment.as_deref().filter(|f| !f.trim().is_empty());
        match (self.kind.is_markup_like(), fragment) {
            (true, Some(markup)) => self.region.set_markup(markup),
            (true, None) => self.region.clear_markup(),
            (false, Some(source)) => self.debouncer.schedule(source.to_string(), now),
            (false, None) => self.debouncer.cancel(),
        }
    }

    /// Runs the pending mount attempt if its window has elapsed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.debouncer.take_due(now) {
            Some(source) => self.attempt_mount(&source),
            None => false,
        }
    }

    /// Runs the pending mount attempt immediately.
    pub fn flush(&mut self) -> bool {
        match self.debouncer.take_now() {
            Some(source) => self.attempt_mount(&source),
            None => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.debouncer.is_pending()
    }

    fn attempt_mount(&mut self, fragment: &str) -> bool {
        if self.mounted_source.as_deref() == Some(fragment) {
            return true;
        }
        self.stats.attempts += 1;

        match self.render(fragment) {
            Ok(tree) => {
                self.region.mount(tree);
                self.mounted_source = Some(fragment.to_string());
                self.stats.mounts += 1;
                true
            }
            Err(failure) => {
                self.record(failure);
                false
            }
        }
    }

    fn render(&self, fragment: &str) -> Result<ElementNode, RenderFailure> {
        let source = strip_module_syntax(fragment);
        let compiled = self.compiler.compile(&source, &self.options)?;
        Ok(evaluate_component(&compiled, &self.registry)?)
    }

    fn record(&mut self, failure: RenderFailure) {
        match failure.class {
            FailureClass::Transient => {
                self.stats.transient_failures += 1;
                log::debug!("transient {} failure: {}", failure.stage, failure.message);
            }
            FailureClass::Fatal => {
                self.stats.fatal_failures += 1;
                log::error!("fatal {} failure: {}", failure.stage, failure.message);
                self.fatal.push(failure);
            }
        }
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn region(&self) -> &PreviewRegion {
        &self.region
    }

    pub fn mounted_tree(&self) -> Option<&ElementNode> {
        self.region.mounted_tree()
    }

    pub fn markup(&self) -> Option<&str> {
        self.region.markup()
    }

    /// True when there is nothing to show for the current fragment.
    pub fn shows_placeholder(&self) -> bool {
        let no_fragment = self.fragment.as_deref().map_or(true, |f| f.trim().is_empty());
        if no_fragment {
            return true;
        }
        if self.kind.is_markup_like() {
            self.region.markup().is_none()
        } else {
            self.region.mounted_tree().is_none()
        }
    }

    pub fn stats(&self) -> RenderStats {
        self.stats
    }

    pub fn fatal_failures(&self) -> &[RenderFailure] {
        &self.fatal
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Compiler double: passes the source through when it ends in `;`
    /// and rejects it as partial otherwise.
    #[derive(Clone, Default)]
    pub(crate) struct PassthroughCompiler {
        pub calls: Arc<Mutex<Vec<String>>>,
    }

    impl Compiler for PassthroughCompiler {
        fn compile(&self, source: &str, _options: &CompileOptions) -> Result<String, CompileError> {
            self.calls.lock().unwrap().push(source.to_string());
            if source.trim_end().ends_with(';') {
                Ok(source.to_string())
            } else {
                Err(CompileError::Syntax("unexpected end of input".to_string()))
            }
        }
    }

    struct MissingCompiler;

    impl Compiler for MissingCompiler {
        fn compile(&self, _source: &str, _options: &CompileOptions) -> Result<String, CompileError> {
            Err(CompileError::Unavailable("`esbuild` was not found on PATH".to_string()))
        }
    }

    fn pipeline(kind: ContentKind) -> (RenderPipeline, PassthroughCompiler) {
        let compiler = PassthroughCompiler::default();
        let pipeline = RenderPipeline::new(kind, Box::new(compiler.clone()), Duration::from_millis(100));
        (pipeline, compiler)
    }

    const RED_BUTTON: &str = r#"```jsx
const App = () => React.createElement("button", { style: { background: "red" } }, "Click");
```"#;

    #[test]
    fn test_structured_fragment_mounts_after_window() {
        let start = Instant::now();
        let (mut pipeline, _compiler) = pipeline(ContentKind::StructuredUi);

        pipeline.on_text_changed(RED_BUTTON, start);
        assert!(!pipeline.poll(start + Duration::from_millis(50)));
        assert!(pipeline.mounted_tree().is_none());

        assert!(pipeline.poll(start + Duration::from_millis(100)));
        let button = pipeline.mounted_tree().and_then(|t| t.find_tag("button")).expect("button");
        assert_eq!(button.style("background"), Some("red"));
        assert!(!pipeline.shows_placeholder());
    }

    #[test]
    fn test_only_latest_fragment_is_attempted() {
        let start = Instant::now();
        let (mut pipeline, compiler) = pipeline(ContentKind::StructuredUi);

        pipeline.on_text_changed("```jsx\nconst App = () => create", start);
        pipeline.on_text_changed("```jsx\nconst App = () => createElement(\"i\", null);", start + Duration::from_millis(60));
        assert!(!pipeline.poll(start + Duration::from_millis(120)));
        assert!(pipeline.poll(start + Duration::from_millis(160)));

        let calls = compiler.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["const App = () => createElement(\"i\", null);"]);
    }

    #[test]
    fn test_failed_mount_keeps_previous_tree() {
        let start = Instant::now();
        let (mut pipeline, _compiler) = pipeline(ContentKind::StructuredUi);
        pipeline.on_text_changed(RED_BUTTON, start);
        assert!(pipeline.flush());
        let before = pipeline.mounted_tree().cloned();

        pipeline.on_text_changed("```jsx\nconst App = () => {", start);
        assert!(!pipeline.flush());
        pipeline.on_text_changed("```jsx\nconst App = () => missing();", start);
        assert!(!pipeline.flush());

        assert_eq!(pipeline.mounted_tree().cloned(), before);
        assert_eq!(pipeline.stats().transient_failures, 2);
        assert!(pipeline.fatal_failures().is_empty());
    }

    #[test]
    fn test_module_syntax_is_stripped_before_compile() {
        let (mut pipeline, compiler) = pipeline(ContentKind::StructuredUi);
        pipeline.on_text_changed(
            "```tsx\nimport React from 'react';\nexport default function App() { return createElement(\"p\", null); };\n```",
            Instant::now(),
        );
        assert!(pipeline.flush());
        let calls = compiler.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec!["\nfunction App() { return createElement(\"p\", null); };"]
        );
    }

    #[test]
    fn test_missing_compiler_is_fatal_and_contained() {
        let mut pipeline = RenderPipeline::new(
            ContentKind::StructuredUi,
            Box::new(MissingCompiler),
            Duration::ZERO,
        );
        pipeline.on_text_changed(RED_BUTTON, Instant::now());
        assert!(!pipeline.poll(Instant::now()));

        let fatal = pipeline.fatal_failures();
        assert_eq!(fatal.len(), 1);
        assert_eq!(fatal[0].class, FailureClass::Fatal);
        assert_eq!(fatal[0].stage, RenderStage::Compile);
        assert!(pipeline.shows_placeholder());
    }

    #[test]
    fn test_markup_is_applied_verbatim_without_debounce() {
        let (mut pipeline, compiler) = pipeline(ContentKind::Markup);
        pipeline.on_text_changed("```html\n<div class=\"card\">Hi</div>\n```", Instant::now());

        assert_eq!(pipeline.markup(), Some("<div class=\"card\">Hi</div>"));
        assert!(!pipeline.is_pending());
        assert!(compiler.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_empty_text_shows_placeholder() {
        let (mut pipeline, _compiler) = pipeline(ContentKind::Stylesheet);
        assert!(pipeline.shows_placeholder());
        pipeline.on_text_changed("   ", Instant::now());
        assert_eq!(pipeline.fragment(), Some(""));
        assert!(pipeline.shows_placeholder());
        pipeline.on_text_changed("<style>p{}</style>", Instant::now());
        assert!(!pipeline.shows_placeholder());
    }

    #[test]
    fn test_switching_kind_releases_target() {
        let (mut pipeline, _compiler) = pipeline(ContentKind::StructuredUi);
        pipeline.on_text_changed(RED_BUTTON, Instant::now());
        assert!(pipeline.flush());
        assert!(pipeline.region().target().is_some());

        pipeline.set_kind(ContentKind::Markup);
        assert!(pipeline.region().target().is_none());
        assert_eq!(pipeline.fragment(), None);
    }
}
