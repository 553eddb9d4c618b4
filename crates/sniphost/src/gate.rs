use async_trait::async_trait;
use snipcore::{DependencyError, DependencyRef, InstallError};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;

/// External package-installation capability, opaque to the host.
#[async_trait]
pub trait Installer: Send + Sync {
    async fn install(&self, dep: &DependencyRef) -> Result<(), InstallError>;
}

/// Installer for hosts that run only dependency-free snippets; any actual
/// installation request is an error.
pub struct NullInstaller;

#[async_trait]
impl Installer for NullInstaller {
    async fn install(&self, dep: &DependencyRef) -> Result<(), InstallError> {
        Err(InstallError(format!(
            "no package installer configured, cannot install '{dep}'"
        )))
    }
}

struct GateState {
    satisfied: HashSet<DependencyRef>,
    in_flight: HashMap<DependencyRef, Arc<Mutex<()>>>,
}

/// Deduplicates and satisfies dependency requirements across all loaded
/// snippets before execution.
///
/// The satisfied set is the only mutable state shared across concurrent
/// node executions: created empty at host start, grown monotonically,
/// never shrunk within a run. Concurrent `ensure` calls for the same ref
/// collapse to a single installation attempt; distinct refs proceed
/// independently.
pub struct DependencyGate {
    installer: Arc<dyn Installer>,
    state: Mutex<GateState>,
}

impl DependencyGate {
    pub fn new(installer: Arc<dyn Installer>) -> Self {
        Self {
            installer,
            state: Mutex::new(GateState {
                satisfied: HashSet::new(),
                in_flight: HashMap::new(),
            }),
        }
    }

    /// Satisfy every ref not already in the satisfied set.
    ///
    /// On installation failure the ref is left unsatisfied, so a later
    /// `ensure` retries it. On success later calls are no-ops.
    pub async fn ensure(&self, deps: &HashSet<DependencyRef>) -> Result<(), DependencyError> {
        for dep in deps {
            // Fast path, and hand out the per-ref install lock otherwise.
            let install_lock = {
                let mut state = self.state.lock().await;
                if state.satisfied.contains(dep) {
                    continue;
                }
                state
                    .in_flight
                    .entry(dep.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            };

            let _guard = install_lock.lock().await;

            // Another caller may have finished the install while we waited.
            if self.state.lock().await.satisfied.contains(dep) {
                continue;
            }

            tracing::info!(dependency = %dep, "installing dependency");
            match self.installer.install(dep).await {
                Ok(()) => {
                    let mut state = self.state.lock().await;
                    state.satisfied.insert(dep.clone());
                    state.in_flight.remove(dep);
                }
                Err(e) => {
                    tracing::error!(dependency = %dep, error = %e, "dependency installation failed");
                    return Err(DependencyError {
                        dep: dep.clone(),
                        cause: e.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub async fn is_satisfied(&self, dep: &DependencyRef) -> bool {
        self.state.lock().await.satisfied.contains(dep)
    }
}
