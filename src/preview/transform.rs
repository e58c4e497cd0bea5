use regex::Regex;
use std::sync::OnceLock;

struct ModuleSyntaxPatterns {
    import: Regex,
    export_default: Regex,
    export: Regex,
}

fn patterns() -> &'static ModuleSyntaxPatterns {
    static PATTERNS: OnceLock<ModuleSyntaxPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| ModuleSyntaxPatterns {
        // `.` stops at newlines, so an import is removed up to the first `;`
        // on the line where its specifier list ends.
        import: Regex::new(r"import\s+.*?;").expect("import pattern is valid"),
        export_default: Regex::new(r"export\s+default\s+").expect("export default pattern is valid"),
        export: Regex::new(r"export\s+").expect("export pattern is valid"),
    })
}

/// Removes module syntax the evaluated unit cannot contain: `import …;`
/// statements and `export default` / `export` keywords.
pub fn strip_module_syntax(source: &str) -> String {
    let patterns = patterns();
    let without_imports = patterns.import.replace_all(source, "");
    let without_default = patterns.export_default.replace_all(&without_imports, "");
    patterns.export.replace_all(&without_default, "").into_owned()
}
