use serde::{Deserialize, Serialize};
use std::fmt;

/// Declared category of the requested output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentKind {
    /// A component fragment that is compiled and mounted.
    StructuredUi,
    /// Raw HTML injected into the preview.
    Markup,
    /// HTML with a scoped stylesheet, injected like markup.
    Stylesheet,
}

impl ContentKind {
    pub fn default_profile(self) -> InstructionProfile {
        match self {
            ContentKind::StructuredUi => InstructionProfile::ReactTs,
            ContentKind::Markup => InstructionProfile::HtmlTailwind,
            ContentKind::Stylesheet => InstructionProfile::HtmlCss,
        }
    }

    /// Markup and stylesheet output is injected as-is rather than compiled.
    pub fn is_markup_like(self) -> bool {
        matches!(self, ContentKind::Markup | ContentKind::Stylesheet)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::StructuredUi => "react",
            ContentKind::Markup => "html",
            ContentKind::Stylesheet => "css",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Canned system instruction selected per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InstructionProfile {
    ReactTs,
    ReactJs,
    ReactTsCss,
    ReactJsCss,
    HtmlTailwind,
    HtmlCss,
}

const COMPONENT_RULES_AMBIENT: &str = "Assume `React`, `useState`, `useEffect` and the UI primitives `Button`, `Card`, `Input`, `TextArea`, `Terminal` and `Text` are already in scope.";
const COMPONENT_RULES_RUNTIME_ONLY: &str =
    "Assume `React`, `useState` and `useEffect` are already in scope.";
const COMPONENT_RULES_NAMING: &str = "Name the component `App`, declared as `const App = () => { ... }` or `function App() { ... }`, and make it the last definition.";

impl InstructionProfile {
    pub const ALL: [InstructionProfile; 6] = [
        InstructionProfile::ReactTs,
        InstructionProfile::ReactJs,
        InstructionProfile::ReactTsCss,
        InstructionProfile::ReactJsCss,
        InstructionProfile::HtmlTailwind,
        InstructionProfile::HtmlCss,
    ];

    pub fn content_kind(self) -> ContentKind {
        match self {
            InstructionProfile::ReactTs
            | InstructionProfile::ReactJs
            | InstructionProfile::ReactTsCss
            | InstructionProfile::ReactJsCss => ContentKind::StructuredUi,
            InstructionProfile::HtmlTailwind => ContentKind::Markup,
            InstructionProfile::HtmlCss => ContentKind::Stylesheet,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            InstructionProfile::ReactTs => "react-ts",
            InstructionProfile::ReactJs => "react-js",
            InstructionProfile::ReactTsCss => "react-ts-css",
            InstructionProfile::ReactJsCss => "react-js-css",
            InstructionProfile::HtmlTailwind => "html-tailwind",
            InstructionProfile::HtmlCss => "html-css",
        }
    }

    /// Accepts a profile name or one of the short kind names.
    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "react" | "tsx" | "structured-ui" => Some(InstructionProfile::ReactTs),
            "jsx" => Some(InstructionProfile::ReactJs),
            "react-css" => Some(InstructionProfile::ReactTsCss),
            "html" | "markup" => Some(InstructionProfile::HtmlTailwind),
            "css" | "stylesheet" => Some(InstructionProfile::HtmlCss),
            other => Self::ALL.into_iter().find(|profile| profile.name() == other),
        }
    }

    /// Fence tag the instruction asks the model to use.
    pub fn fence_tag(self) -> &'static str {
        match self {
            InstructionProfile::ReactTs | InstructionProfile::ReactTsCss => "tsx",
            InstructionProfile::ReactJs | InstructionProfile::ReactJsCss => "jsx",
            InstructionProfile::HtmlTailwind | InstructionProfile::HtmlCss => "html",
        }
    }

    pub fn system_instruction(self) -> String {
        match self {
            InstructionProfile::ReactTs => component_instruction(
                "Write one functional React component in TypeScript, with interfaces for its props.",
                COMPONENT_RULES_AMBIENT,
                "Style it with Tailwind CSS utility classes.",
                self.fence_tag(),
            ),
            InstructionProfile::ReactJs => component_instruction(
                "Write one functional React component in plain JavaScript without any TypeScript types or interfaces.",
                COMPONENT_RULES_AMBIENT,
                "Style it with Tailwind CSS utility classes.",
                self.fence_tag(),
            ),
            InstructionProfile::ReactTsCss => component_instruction(
                "Write one functional React component in TypeScript.",
                COMPONENT_RULES_RUNTIME_ONLY,
                "Do not use Tailwind. Style it with plain CSS through a `const styles = { ... }` object or a `<style>` element rendered by the component.",
                self.fence_tag(),
            ),
            InstructionProfile::ReactJsCss => component_instruction(
                "Write one functional React component in plain JavaScript without TypeScript types.",
                COMPONENT_RULES_RUNTIME_ONLY,
                "Do not use Tailwind. Style it with plain CSS through a `const styles = { ... }` object or a `<style>` element rendered by the component.",
                self.fence_tag(),
            ),
            InstructionProfile::HtmlTailwind => [
                "You are Nexus, a UI specialist.",
                "",
                "Output rules:",
                "1. Produce only the HTML for the requested component.",
                "2. Begin the reply with ```html and nothing before it.",
                "3. Style everything with Tailwind CSS classes using the `class` attribute.",
                "4. The page background is dark (bg-slate-950); keep text and surfaces readable on it.",
                "5. Leave out <html>, <head> and <body>; emit the component markup only.",
                "6. No explanations outside the code block.",
            ]
            .join("\n"),
            InstructionProfile::HtmlCss => [
                "You are Nexus, a CSS architect.",
                "",
                "Output rules:",
                "1. Produce an HTML structure together with a scoped <style> block of plain CSS.",
                "2. Begin the reply with ```html and nothing before it.",
                "3. Do not use Tailwind; use semantic class names and hand-written CSS.",
                "4. The page background is dark; keep the result visible on it.",
                "5. No explanations outside the code block.",
            ]
            .join("\n"),
        }
    }
}

fn component_instruction(language: &str, ambient: &str, styling: &str, fence: &str) -> String {
    [
        "You are Nexus, a senior React engineer.".to_string(),
        String::new(),
        "Output rules:".to_string(),
        format!("1. {language}"),
        format!("2. Never write import or export statements. {ambient}"),
        format!("3. {styling}"),
        format!("4. Wrap the code in a single ```{fence} block and start the reply with it."),
        format!("5. {COMPONENT_RULES_NAMING}"),
        "6. No explanations outside the code block.".to_string(),
    ]
    .join("\n")
}

impl fmt::Display for InstructionProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A prompt together with the profile it should be answered with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    prompt: String,
    profile: InstructionProfile,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, profile: InstructionProfile) -> Self {
        Self {
            prompt: prompt.into(),
            profile,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn profile(&self) -> InstructionProfile {
        self.profile
    }

    pub fn content_kind(&self) -> ContentKind {
        self.profile.content_kind()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_map_to_content_kinds() {
        assert_eq!(
            InstructionProfile::ReactJsCss.content_kind(),
            ContentKind::StructuredUi
        );
        assert_eq!(
            InstructionProfile::HtmlTailwind.content_kind(),
            ContentKind::Markup
        );
        assert_eq!(
            InstructionProfile::HtmlCss.content_kind(),
            ContentKind::Stylesheet
        );
        for kind in [
            ContentKind::StructuredUi,
            ContentKind::Markup,
            ContentKind::Stylesheet,
        ] {
            assert_eq!(kind.default_profile().content_kind(), kind);
        }
    }

    #[test]
    fn test_parse_accepts_short_names_and_profile_names() {
        assert_eq!(
            InstructionProfile::parse("React"),
            Some(InstructionProfile::ReactTs)
        );
        assert_eq!(
            InstructionProfile::parse(" css "),
            Some(InstructionProfile::HtmlCss)
        );
        for profile in InstructionProfile::ALL {
            assert_eq!(InstructionProfile::parse(profile.name()), Some(profile));
        }
        assert_eq!(InstructionProfile::parse("svelte"), None);
    }

    #[test]
    fn test_component_instructions_forbid_imports_and_name_app() {
        for profile in InstructionProfile::ALL
            .into_iter()
            .filter(|profile| profile.content_kind() == ContentKind::StructuredUi)
        {
            let text = profile.system_instruction();
            assert!(text.contains("Never write import or export statements"));
            assert!(text.contains("`App`"));
            assert!(text.contains(&format!("```{}", profile.fence_tag())));
        }
    }

    #[test]
    fn test_markup_instructions_request_html_fence() {
        for profile in [InstructionProfile::HtmlTailwind, InstructionProfile::HtmlCss] {
            assert!(profile.system_instruction().contains("```html"));
        }
    }
}
