use crate::{
    actions::application::service::{
        action_service::VmActionApi, refresh_scheduler::RefreshScheduler,
        vm_action_controller::VmActionController,
    },
    availability::application::service::availability_resolver::{
        AvailabilityOptions, derive_vm_availability,
    },
    core::domain::{
        error::DashboardResult,
        model::{
            availability::AvailabilityVerdict, host::HostIndex,
            inventory_snapshot::InventorySnapshot, virtual_machine::VirtualMachine,
        },
    },
    dashboard::view::{ViewKind, ViewPayload, render_view},
    inventory::application::service::inventory_service::InventoryService,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Identifies a VM across snapshots: lower-cased host and name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct VmKey {
    host: String,
    name: String,
}

impl VmKey {
    fn new(host: &str, name: &str) -> Self {
        Self {
            host: host.trim().to_lowercase(),
            name: name.trim().to_lowercase(),
        }
    }
}

/// Owns the dashboard's state for the lifetime of a session.
///
/// Holds the current snapshot and one action controller per displayed VM.
/// A refresh supersedes the snapshot wholesale and is the single point where
/// controllers learn the server-confirmed state of their VM.
pub struct DashboardContext {
    inventory: InventoryService,
    actions: Arc<dyn VmActionApi>,
    scheduler: Arc<dyn RefreshScheduler>,
    refresh_delay: Duration,
    snapshot: Option<Arc<InventorySnapshot>>,
    controllers: HashMap<VmKey, Arc<VmActionController>>,
}

impl DashboardContext {
    pub fn new(
        inventory: InventoryService,
        actions: Arc<dyn VmActionApi>,
        scheduler: Arc<dyn RefreshScheduler>,
        refresh_delay: Duration,
    ) -> Self {
        Self {
            inventory,
            actions,
            scheduler,
            refresh_delay,
            snapshot: None,
            controllers: HashMap::new(),
        }
    }

    /// Runs one reconciliation pass and installs the result.
    ///
    /// On failure the previous snapshot stays in place and the error is returned
    /// unchanged; callers route `AuthRequired` to the login flow.
    pub async fn refresh(&mut self) -> DashboardResult<Arc<InventorySnapshot>> {
        let snapshot = Arc::new(self.inventory.fetch_inventory().await?);

        let mut gone = Vec::new();
        for (key, controller) in &self.controllers {
            match snapshot.find_vm(&key.host, &key.name) {
                Some(vm) => controller.reconcile(vm.clone()).await,
                None => gone.push(key.clone()),
            }
        }
        for key in gone {
            debug!(host = %key.host, vm = %key.name, "VM left the inventory, dropping controller");
            self.controllers.remove(&key);
        }

        self.snapshot = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    pub fn snapshot(&self) -> Option<Arc<InventorySnapshot>> {
        self.snapshot.clone()
    }

    pub fn host_index(&self) -> Option<&HostIndex> {
        self.snapshot.as_deref().map(InventorySnapshot::host_index)
    }

    /// Availability of `vm` against the current snapshot's hosts.
    pub fn availability_for(&self, vm: &VirtualMachine) -> AvailabilityVerdict {
        let options = AvailabilityOptions {
            host_index: self.host_index(),
            ..Default::default()
        };
        derive_vm_availability(vm, options)
    }

    /// The action controller for a VM of the current snapshot, created on first use.
    pub fn controller_for(&mut self, host: &str, vm_name: &str) -> Option<Arc<VmActionController>> {
        let key = VmKey::new(host, vm_name);
        if let Some(controller) = self.controllers.get(&key) {
            return Some(Arc::clone(controller));
        }

        let vm = self.snapshot.as_deref()?.find_vm(host, vm_name)?.clone();
        let controller = Arc::new(VmActionController::new(
            vm,
            Arc::clone(&self.actions),
            Arc::clone(&self.scheduler),
            self.refresh_delay,
        ));
        self.controllers.insert(key, Arc::clone(&controller));
        Some(controller)
    }

    /// Builds the payload for `kind` from the current snapshot.
    pub fn render(&self, kind: ViewKind) -> ViewPayload {
        render_view(kind, self.snapshot.as_deref())
    }

    /// Shows a view, fetching the inventory first if none has been loaded yet
    /// or the view asks for fresh data.
    pub async fn enter_view(&mut self, kind: ViewKind) -> DashboardResult<ViewPayload> {
        if self.snapshot.is_none() || kind.refreshes_on_enter() {
            self.refresh().await?;
        }
        Ok(self.render(kind))
    }
}
