pub mod compiler;
pub mod debounce;
pub mod element;
pub mod extract;
pub mod pipeline;
pub mod scope;
pub mod script;
pub mod target;
pub mod transform;

pub use compiler::{CompileError, CompileOptions, Compiler, EsbuildCompiler, SyntaxExtension};
pub use element::ElementNode;
pub use extract::extract_fragment;
pub use pipeline::{FailureClass, RenderFailure, RenderPipeline, RenderStage, RenderStats};
pub use scope::{AmbientRegistry, Capability};
pub use target::{PreviewRegion, RenderTarget};
