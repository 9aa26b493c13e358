//! Detection runner that orchestrates a full check.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analysis::{Matchers, RouteRecord, SourceAnalyzer, TypeScriptAnalyzer};
use crate::config::Config;
use crate::controller;
use crate::error::CheckError;
use crate::routes::{self, ControllerRoutes};

use super::rules::{self, RuleOptions};
use super::{MethodVerdict, RunSummary, SkipReason, SkippedRoute};

/// Checks every routed handler of a project against the rules.
pub struct Runner<'a> {
    project_root: PathBuf,
    config: &'a Config,
    analyzer: Box<dyn SourceAnalyzer>,
    parallel: bool,
}

/// What one controller contributed to the run.
#[derive(Default)]
struct ControllerOutcome {
    verdicts: Vec<MethodVerdict>,
    skipped: Vec<SkippedRoute>,
    whitelisted: usize,
}

impl<'a> Runner<'a> {
    /// Create a runner for a project using the TypeScript analyzer.
    pub fn new<P: AsRef<Path>>(project_root: P, config: &'a Config) -> Self {
        Self {
            project_root: project_root.as_ref().to_path_buf(),
            config,
            analyzer: Box::new(TypeScriptAnalyzer::new()),
            parallel: true,
        }
    }

    /// Use a different source analyzer.
    pub fn with_analyzer(mut self, analyzer: Box<dyn SourceAnalyzer>) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Set whether controllers are analyzed in parallel.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run the full pipeline.
    ///
    /// Fails only when the routing file cannot be read or parsed, or when
    /// the configured conventions do not compile.
    pub fn run(&self) -> Result<RunSummary, CheckError> {
        let matchers = Matchers::new(&self.config.conventions)
            .map_err(|e| CheckError::InvalidConfig(e.to_string()))?;
        let options = RuleOptions {
            strict: self.config.strict_mode,
            catalog: self.config.conventions.error_catalog.clone(),
            catalog_import_path: self.config.error_catalog_import_path.clone(),
        };

        let routes_path = self.project_root.join(&self.config.routes_file);
        let routes = routes::load(self.analyzer.as_ref(), &routes_path)?;
        log::debug!(
            "{} routes found in {}",
            routes.len(),
            routes_path.display()
        );

        let groups = routes::group(routes).into_groups();

        // Collect preserves group order, so output is the same either way.
        let outcomes: Vec<ControllerOutcome> = if self.parallel {
            groups
                .par_iter()
                .map(|g| self.check_controller(g, &matchers, &options))
                .collect()
        } else {
            groups
                .iter()
                .map(|g| self.check_controller(g, &matchers, &options))
                .collect()
        };

        let mut verdicts = Vec::new();
        let mut skipped = Vec::new();
        let mut whitelisted = 0;
        for outcome in outcomes {
            verdicts.extend(outcome.verdicts);
            skipped.extend(outcome.skipped);
            whitelisted += outcome.whitelisted;
        }

        Ok(RunSummary::from_verdicts(verdicts, skipped, whitelisted))
    }

    fn check_controller(
        &self,
        group: &ControllerRoutes,
        matchers: &Matchers,
        options: &RuleOptions,
    ) -> ControllerOutcome {
        let mut outcome = ControllerOutcome::default();

        let rel_path = routes::resolve_controller_path(
            &group.controller,
            &self.config.controllers_dir,
            self.analyzer.file_extension(),
        );
        let display_path = rel_path.to_string_lossy().replace('\\', "/");
        let abs_path = self.project_root.join(&rel_path);

        let methods = if abs_path.is_file() {
            match controller::analyze(
                self.analyzer.as_ref(),
                &abs_path,
                &display_path,
                &group.controller,
                matchers,
            ) {
                Ok(methods) => Some(methods),
                Err(e) => {
                    log::warn!("Failed to analyze {}: {}", display_path, e);
                    None
                }
            }
        } else {
            log::warn!(
                "{}: controller file {} not found, skipping its routes",
                group.controller,
                display_path
            );
            None
        };

        let mut evaluated: HashSet<&str> = HashSet::new();
        for route in &group.routes {
            let key = route.handler_key();
            if self.config.is_whitelisted(&key) {
                log::debug!("{} is whitelisted", key);
                outcome.whitelisted += 1;
                continue;
            }

            let Some(known) = methods.as_ref() else {
                outcome.skipped.push(skipped(
                    route,
                    &display_path,
                    SkipReason::MissingControllerFile,
                ));
                continue;
            };

            let Some(facts) = known.get(&route.handler) else {
                log::warn!(
                    "{}: route on line {} points at {}, which is not defined in {}",
                    key,
                    route.line,
                    route.handler,
                    display_path
                );
                outcome
                    .skipped
                    .push(skipped(route, &display_path, SkipReason::MissingHandler));
                continue;
            };

            // Several routes may share one handler; judge it once.
            if !evaluated.insert(route.handler.as_str()) {
                continue;
            }

            outcome.verdicts.push(rules::evaluate(facts, options));
        }

        outcome
    }
}

fn skipped(route: &RouteRecord, file: &str, reason: SkipReason) -> SkippedRoute {
    SkippedRoute {
        controller: route.controller.clone(),
        handler: route.handler.clone(),
        line: route.line,
        file: file.to_string(),
        reason,
    }
}
