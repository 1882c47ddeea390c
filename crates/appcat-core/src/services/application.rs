//! Application interface service - modules and the interfaces built on them.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{
    ApplicationInterfaceDescription, ApplicationModule, InputDataObjectType, OutputDataObjectType,
};
use crate::filter::{FilterTarget, parse_filters};
use crate::ids;
use crate::ports::{
    ApplicationInterfaceRepository, ApplicationModuleRepository, CatalogError, found,
};

/// Service for application modules and interfaces.
pub struct ApplicationInterfaceService {
    modules: Arc<dyn ApplicationModuleRepository>,
    interfaces: Arc<dyn ApplicationInterfaceRepository>,
}

impl ApplicationInterfaceService {
    pub fn new(
        modules: Arc<dyn ApplicationModuleRepository>,
        interfaces: Arc<dyn ApplicationInterfaceRepository>,
    ) -> Self {
        Self {
            modules,
            interfaces,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Modules
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_application_module(
        &self,
        mut module: ApplicationModule,
        gateway_id: &str,
    ) -> Result<String, CatalogError> {
        module.app_module_id = ids::generate_id(&module.app_module_id, &module.app_module_name);
        self.modules.insert(&module, gateway_id).await?;
        info!(id = %module.app_module_id, gateway_id, "Added application module");
        Ok(module.app_module_id)
    }

    pub async fn get_application_module(
        &self,
        id: &str,
    ) -> Result<Option<ApplicationModule>, CatalogError> {
        found(self.modules.get(id).await)
    }

    pub async fn update_application_module(
        &self,
        id: &str,
        mut module: ApplicationModule,
    ) -> Result<(), CatalogError> {
        module.app_module_id = id.to_string();
        Ok(self.modules.update(&module).await?)
    }

    pub async fn remove_application_module(&self, id: &str) -> Result<(), CatalogError> {
        self.modules.delete(id).await?;
        info!(id, "Removed application module");
        Ok(())
    }

    /// Modules matching every filter. Only `appModuleName` is accepted.
    pub async fn get_application_modules(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<ApplicationModule>, CatalogError> {
        let filters = parse_filters(FilterTarget::ApplicationModule, filters)?;
        Ok(self.modules.filter(&filters).await?)
    }

    pub async fn get_all_application_modules(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationModule>, CatalogError> {
        Ok(self.modules.list(gateway_id).await?)
    }

    /// Modules reachable through a deployment the caller may use on a host
    /// the caller may use. Both lists must match the same deployment.
    pub async fn get_accessible_application_modules(
        &self,
        gateway_id: &str,
        deployment_ids: &[String],
        compute_host_ids: &[String],
    ) -> Result<Vec<ApplicationModule>, CatalogError> {
        if deployment_ids.is_empty() || compute_host_ids.is_empty() {
            debug!(gateway_id, "No accessible deployments or hosts");
            return Ok(Vec::new());
        }
        Ok(self
            .modules
            .list_accessible(gateway_id, deployment_ids, compute_host_ids)
            .await?)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Interfaces
    // ─────────────────────────────────────────────────────────────────────────

    pub async fn add_application_interface(
        &self,
        mut interface: ApplicationInterfaceDescription,
        gateway_id: &str,
    ) -> Result<String, CatalogError> {
        interface.application_interface_id = ids::generate_id(
            &interface.application_interface_id,
            &interface.application_name,
        );
        self.interfaces.insert(&interface, gateway_id).await?;
        info!(
            id = %interface.application_interface_id,
            gateway_id,
            "Added application interface"
        );
        Ok(interface.application_interface_id)
    }

    pub async fn get_application_interface(
        &self,
        id: &str,
    ) -> Result<Option<ApplicationInterfaceDescription>, CatalogError> {
        found(self.interfaces.get(id).await)
    }

    /// Replace an interface, including its inputs, outputs and module list.
    pub async fn update_application_interface(
        &self,
        id: &str,
        mut interface: ApplicationInterfaceDescription,
    ) -> Result<(), CatalogError> {
        interface.application_interface_id = id.to_string();
        Ok(self.interfaces.update(&interface).await?)
    }

    pub async fn remove_application_interface(&self, id: &str) -> Result<(), CatalogError> {
        self.interfaces.delete(id).await?;
        info!(id, "Removed application interface");
        Ok(())
    }

    /// Interfaces matching every filter. Only `applicationName` is accepted.
    pub async fn get_application_interfaces(
        &self,
        filters: &BTreeMap<String, String>,
    ) -> Result<Vec<ApplicationInterfaceDescription>, CatalogError> {
        let filters = parse_filters(FilterTarget::ApplicationInterface, filters)?;
        Ok(self.interfaces.filter(&filters).await?)
    }

    pub async fn get_all_application_interfaces(
        &self,
        gateway_id: &str,
    ) -> Result<Vec<ApplicationInterfaceDescription>, CatalogError> {
        Ok(self.interfaces.list(gateway_id).await?)
    }

    pub async fn get_all_application_interface_ids(&self) -> Result<Vec<String>, CatalogError> {
        Ok(self.interfaces.list_ids().await?)
    }

    /// Append a module to an interface's module list.
    pub async fn add_application_module_mapping(
        &self,
        module_id: &str,
        interface_id: &str,
    ) -> Result<(), CatalogError> {
        self.interfaces
            .add_module_mapping(interface_id, module_id)
            .await?;
        debug!(module_id, interface_id, "Mapped module to interface");
        Ok(())
    }

    /// Inputs of an interface, in stored order.
    pub async fn get_application_inputs(
        &self,
        interface_id: &str,
    ) -> Result<Vec<InputDataObjectType>, CatalogError> {
        Ok(self.interfaces.get(interface_id).await?.application_inputs)
    }

    /// Outputs of an interface, in stored order.
    pub async fn get_application_outputs(
        &self,
        interface_id: &str,
    ) -> Result<Vec<OutputDataObjectType>, CatalogError> {
        Ok(self.interfaces.get(interface_id).await?.application_outputs)
    }
}
