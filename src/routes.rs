//! Route extraction, grouping and controller path resolution.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::{RouteRecord, SourceAnalyzer, TypeScriptAnalyzer};
use crate::error::CheckError;

/// Extract route records from routing source text.
///
/// Calls that are not `<registrar>.<verb>(path, [Controller, 'method'])`
/// are ignored.
pub fn extract(source: &str) -> anyhow::Result<Vec<RouteRecord>> {
    let analyzer = TypeScriptAnalyzer::new();
    extract_with(&analyzer, Path::new("routes.ts"), source.as_bytes())
}

/// Extract route records with a specific analyzer.
pub fn extract_with(
    analyzer: &dyn SourceAnalyzer,
    path: &Path,
    source: &[u8],
) -> anyhow::Result<Vec<RouteRecord>> {
    let parsed = analyzer.parse(path, source)?;
    analyzer.extract_routes(&parsed)
}

/// Read the routing file and extract its routes.
///
/// An unreadable routing file is the one fatal input error of a run.
pub fn load(analyzer: &dyn SourceAnalyzer, path: &Path) -> Result<Vec<RouteRecord>, CheckError> {
    let source = fs::read(path).map_err(|source| CheckError::RoutesFile {
        path: path.to_path_buf(),
        source,
    })?;
    extract_with(analyzer, path, &source).map_err(|e| CheckError::Analysis {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Routes of one controller, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerRoutes {
    pub controller: String,
    pub routes: Vec<RouteRecord>,
}

/// Routes partitioned by controller.
///
/// Controllers iterate in first-seen order so runs are reproducible.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteGroups {
    groups: Vec<ControllerRoutes>,
}

impl RouteGroups {
    pub fn iter(&self) -> impl Iterator<Item = &ControllerRoutes> {
        self.groups.iter()
    }

    pub fn get(&self, controller: &str) -> Option<&[RouteRecord]> {
        self.groups
            .iter()
            .find(|g| g.controller == controller)
            .map(|g| g.routes.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn into_groups(self) -> Vec<ControllerRoutes> {
        self.groups
    }
}

/// Group routes by controller, keeping route order within each controller.
pub fn group(routes: Vec<RouteRecord>) -> RouteGroups {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<ControllerRoutes> = Vec::new();

    for route in routes {
        match index.get(&route.controller) {
            Some(&i) => groups[i].routes.push(route),
            None => {
                index.insert(route.controller.clone(), groups.len());
                groups.push(ControllerRoutes {
                    controller: route.controller.clone(),
                    routes: vec![route],
                });
            }
        }
    }

    RouteGroups { groups }
}

/// Expected source file of a controller.
///
/// `UsersController` in `app/controllers` with extension `ts` resolves to
/// `app/controllers/users_controller.ts`. No filesystem access.
pub fn resolve_controller_path(
    controller: &str,
    controllers_dir: &Path,
    extension: &str,
) -> PathBuf {
    controllers_dir.join(format!("{}.{}", to_snake_case(controller), extension))
}

/// PascalCase to snake_case: `_` before each uppercase letter that follows a
/// lowercase one, then lowercase everything.
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch.is_uppercase() && prev_lower {
            out.push('_');
        }
        prev_lower = ch.is_lowercase();
        out.extend(ch.to_lowercase());
    }
    out
}
