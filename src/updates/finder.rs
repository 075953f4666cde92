//! Concurrent latest-version lookups

use manifest::{ArtifactChange, ComponentManifest};
use rayon::prelude::*;
use std::path::Path;

use super::{NoPackagePlan, PackagePlanner, ResolveOptions, Result, UpdateSet, VersionResolver};

/// Default number of concurrent lookups
pub const DEFAULT_JOBS: usize = 10;

/// Finds components with newer versions available
pub struct UpdateFinder<'a> {
    resolver: &'a dyn VersionResolver,
    planner: &'a dyn PackagePlanner,
    jobs: usize,
}

impl<'a> UpdateFinder<'a> {
    pub fn new(resolver: &'a dyn VersionResolver) -> Self {
        Self {
            resolver,
            planner: &NoPackagePlan,
            jobs: DEFAULT_JOBS,
        }
    }

    pub fn with_planner(mut self, planner: &'a dyn PackagePlanner) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_jobs(mut self, jobs: usize) -> Self {
        self.jobs = jobs.max(1);
        self
    }

    /// Components of `manifest` with a newer version, plus the package plan
    ///
    /// Every lookup and the package plan query run on a dedicated pool of
    /// `jobs` workers and all of them are awaited. The batch is
    /// all-or-nothing: if any of them fails, the first error is returned and
    /// no partial result is reported.
    pub fn find_updates(
        &self,
        manifest: &ComponentManifest,
        installation: &Path,
        opts: &ResolveOptions,
    ) -> Result<UpdateSet> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.jobs)
            .build()?;

        log::info!(
            "Checking {} components with {} workers",
            manifest.len(),
            self.jobs
        );

        let resolver = self.resolver;
        let planner = self.planner;
        let (lookups, packages) = pool.install(|| {
            rayon::join(
                || {
                    manifest
                        .components
                        .par_iter()
                        .map(|component| {
                            let latest = resolver.latest_version(&component.coordinate, opts)?;
                            let installed = component.parsed_version();
                            log::debug!(
                                "{}: installed {installed}, latest {latest}",
                                component.coordinate
                            );
                            Ok((latest > installed).then(|| {
                                ArtifactChange::updated(
                                    component.coordinate.clone(),
                                    &component.version,
                                    latest.as_str(),
                                )
                            }))
                        })
                        .collect::<Result<Vec<Option<ArtifactChange>>>>()
                },
                || planner.update_plan(installation),
            )
        });

        let mut artifacts: Vec<ArtifactChange> = lookups?.into_iter().flatten().collect();
        artifacts.sort_by(|a, b| a.coordinate.cmp(&b.coordinate));
        let packages = packages?;

        Ok(UpdateSet {
            artifacts,
            packages,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::updates::{PackageUpdate, UpdateError};
    use manifest::{Component, ComponentVersion, Coordinate};
    use std::collections::HashMap;

    /// Resolver answering from a fixed table
    struct FixedResolver(HashMap<String, String>);

    impl FixedResolver {
        fn new(entries: &[(&str, &str)]) -> Self {
            Self(
                entries
                    .iter()
                    .map(|(c, v)| ((*c).to_string(), (*v).to_string()))
                    .collect(),
            )
        }
    }

    impl VersionResolver for FixedResolver {
        fn latest_version(
            &self,
            coordinate: &Coordinate,
            _opts: &ResolveOptions,
        ) -> Result<ComponentVersion> {
            self.0
                .get(coordinate.as_str())
                .map(|v| ComponentVersion::parse(v))
                .ok_or_else(|| UpdateError::Unresolved {
                    coordinate: coordinate.clone(),
                })
        }
    }

    struct FixedPlan;

    impl PackagePlanner for FixedPlan {
        fn update_plan(&self, _installation: &Path) -> Result<Vec<PackageUpdate>> {
            Ok(vec![PackageUpdate {
                name: "web-console".into(),
                current: Some("1".into()),
                target: "2".into(),
            }])
        }
    }

    fn manifest(entries: &[(&str, &str)]) -> ComponentManifest {
        ComponentManifest {
            components: entries
                .iter()
                .map(|(c, v)| Component::new(Coordinate::parse(c).unwrap(), *v))
                .collect(),
        }
    }

    fn find(resolver: &FixedResolver, manifest: &ComponentManifest) -> Result<UpdateSet> {
        UpdateFinder::new(resolver).with_jobs(4).find_updates(
            manifest,
            Path::new("/srv/example"),
            &ResolveOptions::default(),
        )
    }

    #[test]
    fn test_newer_version_reported() {
        let resolver = FixedResolver::new(&[("g:a", "1.1.0")]);
        let updates = find(&resolver, &manifest(&[("g:a", "1.0.0")])).unwrap();
        assert_eq!(
            updates.artifacts,
            vec![ArtifactChange::updated(
                Coordinate::parse("g:a").unwrap(),
                "1.0.0",
                "1.1.0"
            )]
        );
    }

    #[test]
    fn test_same_version_not_reported() {
        let resolver = FixedResolver::new(&[("g:a", "1.0.0")]);
        let updates = find(&resolver, &manifest(&[("g:a", "1.0.0")])).unwrap();
        assert!(updates.is_empty());
    }

    #[test]
    fn test_versions_compared_by_order_not_text() {
        let resolver = FixedResolver::new(&[("g:a", "1.10"), ("g:b", "2.0.0.Beta1")]);
        let installed = manifest(&[("g:a", "1.9"), ("g:b", "2.0.0.Final")]);
        let updates = find(&resolver, &installed).unwrap();
        assert_eq!(updates.artifacts.len(), 1);
        assert_eq!(updates.artifacts[0].new_version(), Some("1.10"));
    }

    #[test]
    fn test_one_failure_fails_batch() {
        let resolver = FixedResolver::new(&[("g:a", "2"), ("g:b", "2")]);
        let result = find(
            &resolver,
            &manifest(&[("g:a", "1"), ("g:b", "1"), ("g:missing", "1")]),
        );
        assert!(matches!(result, Err(UpdateError::Unresolved { .. })));
    }

    #[test]
    fn test_results_sorted_regardless_of_completion_order() {
        let entries: Vec<(String, String)> =
            (0..40).map(|i| (format!("g:a{i:02}"), "1".to_string())).collect();
        let refs: Vec<(&str, &str)> = entries
            .iter()
            .map(|(c, v)| (c.as_str(), v.as_str()))
            .collect();
        let resolver = FixedResolver::new(
            &refs.iter().map(|(c, _)| (*c, "2")).collect::<Vec<_>>(),
        );
        let updates = find(&resolver, &manifest(&refs)).unwrap();
        assert_eq!(updates.artifacts.len(), 40);
        assert!(updates
            .artifacts
            .windows(2)
            .all(|w| w[0].coordinate < w[1].coordinate));
    }

    #[test]
    fn test_package_plan_included() {
        let resolver = FixedResolver::new(&[("g:a", "1")]);
        let updates = UpdateFinder::new(&resolver)
            .with_planner(&FixedPlan)
            .find_updates(
                &manifest(&[("g:a", "1")]),
                Path::new("/srv/example"),
                &ResolveOptions::default(),
            )
            .unwrap();
        assert!(updates.artifacts.is_empty());
        assert_eq!(updates.packages.len(), 1);
        assert!(!updates.is_empty());
    }

    struct BrokenPlan;

    impl PackagePlanner for BrokenPlan {
        fn update_plan(&self, _installation: &Path) -> Result<Vec<PackageUpdate>> {
            Err(UpdateError::Plan("package index unreadable".into()))
        }
    }

    #[test]
    fn test_planner_failure_fails_batch() {
        let resolver = FixedResolver::new(&[("g:a", "2")]);
        let result = UpdateFinder::new(&resolver)
            .with_planner(&BrokenPlan)
            .find_updates(
                &manifest(&[("g:a", "1")]),
                Path::new("/srv/example"),
                &ResolveOptions::default(),
            );
        assert!(matches!(result, Err(UpdateError::Plan(_))));
    }

    /// Planner that only answers from a worker of the lookup pool
    struct PoolOnlyPlan;

    impl PackagePlanner for PoolOnlyPlan {
        fn update_plan(&self, installation: &Path) -> Result<Vec<PackageUpdate>> {
            match rayon::current_thread_index() {
                Some(_) => FixedPlan.update_plan(installation),
                None => Err(UpdateError::Plan("queried outside the pool".into())),
            }
        }
    }

    #[test]
    fn test_package_plan_runs_on_lookup_pool() {
        let resolver = FixedResolver::new(&[("g:a", "2")]);
        let updates = UpdateFinder::new(&resolver)
            .with_planner(&PoolOnlyPlan)
            .with_jobs(2)
            .find_updates(
                &manifest(&[("g:a", "1")]),
                Path::new("/srv/example"),
                &ResolveOptions::default(),
            )
            .unwrap();
        assert_eq!(updates.artifacts.len(), 1);
        assert_eq!(updates.packages.len(), 1);
    }

    #[test]
    fn test_lookup_failure_wins_over_plan() {
        let resolver = FixedResolver::new(&[]);
        let result = UpdateFinder::new(&resolver)
            .with_planner(&FixedPlan)
            .find_updates(
                &manifest(&[("g:missing", "1")]),
                Path::new("/srv/example"),
                &ResolveOptions::default(),
            );
        assert!(matches!(result, Err(UpdateError::Unresolved { .. })));
    }
}
