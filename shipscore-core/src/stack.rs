//! Technology detection from manifest files and the filesystem index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::index::FileIndex;

/// Ordered framework candidates: first match wins, so ties cannot happen.
/// Meta-frameworks sit above the libraries they wrap.
const FRAMEWORK_PRIORITY: &[(&str, &[&str])] = &[
    ("Next.js", &["next"]),
    ("Nuxt", &["nuxt", "nuxt3"]),
    ("Remix", &["@remix-run/react"]),
    ("SvelteKit", &["@sveltejs/kit"]),
    ("Astro", &["astro"]),
    ("Angular", &["@angular/core"]),
    ("React", &["react", "react-dom"]),
    ("Vue", &["vue"]),
    ("Svelte", &["svelte"]),
];

/// Ordered build-tool candidates, first match wins.
const BUILD_TOOL_PRIORITY: &[(&str, &[&str])] = &[
    ("Vite", &["vite"]),
    ("Webpack", &["webpack"]),
    ("Parcel", &["parcel"]),
    ("Rollup", &["rollup"]),
    ("esbuild", &["esbuild"]),
];

const STYLING_MARKERS: &[(&str, &[&str])] = &[
    ("Tailwind CSS", &["tailwindcss"]),
    ("styled-components", &["styled-components"]),
    ("Sass", &["sass", "node-sass"]),
    ("Bootstrap", &["bootstrap"]),
];

const SERVER_FRAMEWORKS: &[(&str, &[&str])] = &[
    ("Express", &["express"]),
    ("Fastify", &["fastify"]),
    ("Koa", &["koa"]),
    ("NestJS", &["@nestjs/core"]),
    ("Hapi", &["@hapi/hapi", "hapi"]),
];

/// Well-known web-framework name substrings looked for inside Python
/// dependency files.
const PYTHON_WEB_FRAMEWORKS: &[(&str, &str)] = &[
    ("Flask", "flask"),
    ("Django", "django"),
    ("FastAPI", "fastapi"),
];

const PYTHON_DEPENDENCY_FILES: &[&str] = &["requirements.txt", "pyproject.toml", "Pipfile"];

/// Technologies inferred for one workspace. Derived facts only; built once
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackDetection {
    /// Technology name to presence.
    pub technologies: BTreeMap<String, bool>,
    /// Primary frontend framework, `None` when undetermined.
    pub framework: Option<String>,
    /// Primary build tool, `None` when undetermined.
    pub build_tool: Option<String>,
}

impl StackDetection {
    /// Whether a technology was detected.
    pub fn has(&self, name: &str) -> bool {
        self.technologies.get(name).copied().unwrap_or(false)
    }
}

/// Infer the declared stack. Pure function over the index.
pub fn detect(index: &FileIndex) -> StackDetection {
    let manifest = index.manifest();
    let mut technologies = BTreeMap::new();
    let mut mark = |name: &str, present: bool| {
        if present {
            technologies.insert(name.to_string(), true);
        }
    };

    // A manifest implies its runtime, even an empty one.
    mark("Node.js", index.exists("package.json"));

    for (name, deps) in FRAMEWORK_PRIORITY
        .iter()
        .chain(BUILD_TOOL_PRIORITY)
        .chain(STYLING_MARKERS)
        .chain(SERVER_FRAMEWORKS)
    {
        mark(name, manifest.any_dependency(deps).is_some());
    }

    mark(
        "TypeScript",
        manifest.has_dependency("typescript") || index.exists("tsconfig.json"),
    );

    let python_deps = PYTHON_DEPENDENCY_FILES
        .iter()
        .find(|file| index.exists(file))
        .and_then(|file| index.read_to_string(file));
    if let Some(contents) = python_deps {
        mark("Python", true);
        let lowered = contents.to_lowercase();
        for (name, marker) in PYTHON_WEB_FRAMEWORKS {
            mark(name, lowered.contains(marker));
        }
    }

    mark(
        "Docker",
        index.exists("Dockerfile") || index.exists("docker-compose.yml"),
    );

    let framework = first_match(FRAMEWORK_PRIORITY, index);
    let build_tool = first_match(BUILD_TOOL_PRIORITY, index);

    // A bare entry page with no framework is a plain static site.
    mark(
        "Static HTML",
        framework.is_none() && index.exists("index.html"),
    );

    StackDetection {
        technologies,
        framework,
        build_tool,
    }
}

fn first_match(priority: &[(&str, &[&str])], index: &FileIndex) -> Option<String> {
    priority
        .iter()
        .find(|(_, deps)| index.manifest().any_dependency(deps).is_some())
        .map(|(name, _)| name.to_string())
}

#[cfg(test)]
mod tests {
    use super::detect;
    use crate::fs::StdFileSystem;
    use crate::index::FileIndex;
    use std::path::PathBuf;
    use std::sync::Arc;

    fn index_for(root: &PathBuf) -> FileIndex {
        FileIndex::build(Arc::new(StdFileSystem::new()), root).expect("index")
    }

    #[test]
    fn meta_framework_outranks_its_library() {
        let root = temp_dir();
        std::fs::write(
            root.join("package.json"),
            r#"{"dependencies": {"next": "14.0.0", "react": "18.0.0", "vite": "5.0.0"}}"#,
        )
        .expect("manifest");

        let stack = detect(&index_for(&root));

        assert_eq!(stack.framework.as_deref(), Some("Next.js"));
        assert_eq!(stack.build_tool.as_deref(), Some("Vite"));
        assert!(stack.has("React"));
        assert!(stack.has("Node.js"));
        assert!(!stack.has("Static HTML"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn dev_dependencies_count_toward_detection() {
        let root = temp_dir();
        std::fs::write(
            root.join("package.json"),
            r#"{"devDependencies": {"typescript": "5.0.0", "webpack": "5.0.0"}}"#,
        )
        .expect("manifest");

        let stack = detect(&index_for(&root));

        assert!(stack.has("TypeScript"));
        assert_eq!(stack.build_tool.as_deref(), Some("Webpack"));
        assert_eq!(stack.framework, None);

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn python_dependency_file_implies_ecosystem_and_frameworks() {
        let root = temp_dir();
        std::fs::write(root.join("requirements.txt"), "Flask==3.0.0\nrequests\n")
            .expect("requirements");

        let stack = detect(&index_for(&root));

        assert!(stack.has("Python"));
        assert!(stack.has("Flask"));
        assert!(!stack.has("Django"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn static_entry_without_framework_is_a_static_site() {
        let root = temp_dir();
        std::fs::write(root.join("index.html"), "<html></html>").expect("html");

        let stack = detect(&index_for(&root));

        assert!(stack.has("Static HTML"));
        assert_eq!(stack.framework, None);
        assert!(!stack.has("Node.js"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    #[test]
    fn container_descriptor_implies_docker() {
        let root = temp_dir();
        std::fs::write(root.join("Dockerfile"), "FROM node:20").expect("dockerfile");

        let stack = detect(&index_for(&root));

        assert!(stack.has("Docker"));

        std::fs::remove_dir_all(&root).expect("cleanup");
    }

    fn temp_dir() -> PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("system time")
            .as_nanos();
        let root = std::env::temp_dir().join(format!("shipscore_stack_test_{nanos}"));
        std::fs::create_dir_all(&root).expect("create temp dir");
        root
    }
}
