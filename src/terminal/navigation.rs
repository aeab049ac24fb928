//! Page navigation capability and site sections.

/// Something that can move the host UI to another page.
pub trait Navigator: Send + Sync {
    fn navigate_to(&self, path: &str);
}

impl<F> Navigator for F
where
    F: Fn(&str) + Send + Sync,
{
    fn navigate_to(&self, path: &str) {
        self(path)
    }
}

/// Navigator for surfaces without page routing.
pub struct NoopNavigator;

impl Navigator for NoopNavigator {
    fn navigate_to(&self, path: &str) {
        tracing::debug!("Navigation to {} ignored", path);
    }
}

/// Site sections reachable with `cd`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Projects,
    About,
}

impl Section {
    /// Match a lower-cased `cd` argument.
    pub fn from_target(target: &str) -> Option<Self> {
        match target {
            "projects" | "projects/" | "./projects" => Some(Section::Projects),
            "about" | "about/" | "./about" => Some(Section::About),
            _ => None,
        }
    }

    pub fn path(&self) -> &'static str {
        match self {
            Section::Projects => "/projects",
            Section::About => "/about",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Section::Projects => "projects",
            Section::About => "about",
        }
    }

    pub fn navigating_message(&self) -> String {
        format!("Navigating to ~/{}...", self.name())
    }
}

/// A button the UI shows for a navigation marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuickAction {
    pub label: &'static str,
    pub command: &'static str,
}

pub const QUICK_ACTIONS: &[QuickAction] = &[
    QuickAction { label: "My Projects", command: "ls" },
    QuickAction { label: "About Me", command: "whoami" },
    QuickAction { label: "Ask AI", command: "help" },
    QuickAction { label: "Matrix Mode", command: "cmatrix" },
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_section_targets() {
        assert_eq!(Section::from_target("./projects"), Some(Section::Projects));
        assert_eq!(Section::from_target("about/"), Some(Section::About));
        assert_eq!(Section::from_target("blog"), None);
        assert_eq!(Section::Projects.navigating_message(), "Navigating to ~/projects...");
    }

    #[test]
    fn test_closure_navigator() {
        let visited = Arc::new(Mutex::new(Vec::new()));
        let sink = visited.clone();
        let nav = move |path: &str| sink.lock().unwrap().push(path.to_string());
        nav.navigate_to("/about");
        assert_eq!(*visited.lock().unwrap(), vec!["/about".to_string()]);
    }
}
