//! Code fence language tags, normalized for the highlighting code block.

use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::LazyLock;

/// Canonical language identity attached to a highlighted code block.
///
/// Serializes with the key order the block editor expects:
/// `{"langType":"ts","langName":"TypeScript"}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageMapping {
    pub lang_type: Cow<'static, str>,
    pub lang_name: Cow<'static, str>,
}

impl LanguageMapping {
    const fn known(lang_type: &'static str, lang_name: &'static str) -> Self {
        Self {
            lang_type: Cow::Borrowed(lang_type),
            lang_name: Cow::Borrowed(lang_name),
        }
    }
}

const LANGUAGES: &[(&str, LanguageMapping)] = &[
    // JavaScript family
    ("javascript", LanguageMapping::known("js", "JavaScript")),
    ("js", LanguageMapping::known("js", "JavaScript")),
    ("jsx", LanguageMapping::known("jsx", "JSX")),
    ("typescript", LanguageMapping::known("ts", "TypeScript")),
    ("ts", LanguageMapping::known("ts", "TypeScript")),
    ("tsx", LanguageMapping::known("tsx", "TSX")),
    ("python", LanguageMapping::known("py", "Python")),
    ("py", LanguageMapping::known("py", "Python")),
    // Web
    ("html", LanguageMapping::known("html", "HTML")),
    ("css", LanguageMapping::known("css", "CSS")),
    ("scss", LanguageMapping::known("scss", "SCSS")),
    ("sass", LanguageMapping::known("sass", "Sass")),
    ("less", LanguageMapping::known("less", "Less")),
    ("json", LanguageMapping::known("json", "JSON")),
    ("xml", LanguageMapping::known("xml", "XML")),
    // Shells
    ("bash", LanguageMapping::known("bash", "Bash")),
    ("sh", LanguageMapping::known("bash", "Bash")),
    ("shell", LanguageMapping::known("bash", "Shell")),
    ("zsh", LanguageMapping::known("bash", "Zsh")),
    ("powershell", LanguageMapping::known("powershell", "PowerShell")),
    ("ps1", LanguageMapping::known("powershell", "PowerShell")),
    // Server side
    ("php", LanguageMapping::known("php", "PHP")),
    ("ruby", LanguageMapping::known("ruby", "Ruby")),
    ("rb", LanguageMapping::known("ruby", "Ruby")),
    ("go", LanguageMapping::known("go", "Go")),
    ("golang", LanguageMapping::known("go", "Go")),
    ("rust", LanguageMapping::known("rust", "Rust")),
    ("java", LanguageMapping::known("java", "Java")),
    ("kotlin", LanguageMapping::known("kotlin", "Kotlin")),
    ("scala", LanguageMapping::known("scala", "Scala")),
    ("swift", LanguageMapping::known("swift", "Swift")),
    // C family
    ("c", LanguageMapping::known("c", "C")),
    ("cpp", LanguageMapping::known("cpp", "C++")),
    ("c++", LanguageMapping::known("cpp", "C++")),
    ("csharp", LanguageMapping::known("csharp", "C#")),
    ("cs", LanguageMapping::known("csharp", "C#")),
    ("objectivec", LanguageMapping::known("objectivec", "Objective-C")),
    // Data and config
    ("sql", LanguageMapping::known("sql", "SQL")),
    ("mysql", LanguageMapping::known("sql", "MySQL")),
    ("postgresql", LanguageMapping::known("sql", "PostgreSQL")),
    ("yaml", LanguageMapping::known("yaml", "YAML")),
    ("yml", LanguageMapping::known("yaml", "YAML")),
    ("toml", LanguageMapping::known("toml", "TOML")),
    ("ini", LanguageMapping::known("ini", "INI")),
    // Markup
    ("markdown", LanguageMapping::known("md", "Markdown")),
    ("md", LanguageMapping::known("md", "Markdown")),
    ("latex", LanguageMapping::known("latex", "LaTeX")),
    ("tex", LanguageMapping::known("latex", "LaTeX")),
    // Everything else
    ("diff", LanguageMapping::known("diff", "Diff")),
    ("docker", LanguageMapping::known("docker", "Dockerfile")),
    ("dockerfile", LanguageMapping::known("docker", "Dockerfile")),
    ("makefile", LanguageMapping::known("makefile", "Makefile")),
    ("nginx", LanguageMapping::known("nginx", "Nginx")),
    ("apache", LanguageMapping::known("apache", "Apache")),
    ("graphql", LanguageMapping::known("graphql", "GraphQL")),
    ("regex", LanguageMapping::known("regex", "Regex")),
    ("vim", LanguageMapping::known("vim", "Vim")),
    ("lua", LanguageMapping::known("lua", "Lua")),
    ("perl", LanguageMapping::known("perl", "Perl")),
    ("r", LanguageMapping::known("r", "R")),
    ("dart", LanguageMapping::known("dart", "Dart")),
    ("elixir", LanguageMapping::known("elixir", "Elixir")),
    ("erlang", LanguageMapping::known("erlang", "Erlang")),
    ("haskell", LanguageMapping::known("haskell", "Haskell")),
    ("clojure", LanguageMapping::known("clojure", "Clojure")),
];

pub static LANGUAGE_MAP: LazyLock<HashMap<&'static str, LanguageMapping>> =
    LazyLock::new(|| LANGUAGES.iter().cloned().collect());

/// Look up the highlighting identity for a fence tag.
///
/// Unknown tags are passed through as their own type, with the first
/// character upper-cased for display. Empty tags have no mapping.
pub fn language_mapping(tag: Option<&str>) -> Option<LanguageMapping> {
    let normalized = tag?.trim().to_lowercase();
    if normalized.is_empty() {
        return None;
    }

    if let Some(mapping) = LANGUAGE_MAP.get(normalized.as_str()) {
        return Some(mapping.clone());
    }

    let mut chars = normalized.chars();
    let lang_name = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
        None => String::new(),
    };
    Some(LanguageMapping {
        lang_type: Cow::Owned(normalized),
        lang_name: Cow::Owned(lang_name),
    })
}
