//! Long-lived clients shared by every page.

use crate::transport::FetchClient;
use eld_planner_core::{AzureMaps, ClientConfig, PlannerClient};
use std::rc::Rc;

pub type Planner = PlannerClient<FetchClient>;
pub type Maps = AzureMaps<FetchClient>;

pub struct Services {
    pub config: ClientConfig,
    pub planner: Planner,
    pub maps: Rc<Maps>,
}

impl Services {
    #[must_use]
    pub fn from_config(config: ClientConfig) -> Self {
        if config.maps_subscription_key.is_empty() {
            log::warn!("AZURE_MAPS_KEY was not set at build time; search and maps will fail");
        }
        let planner = PlannerClient::new(FetchClient, config.api_base_url.clone());
        let maps = Rc::new(AzureMaps::new(
            FetchClient,
            config.maps_base_url.clone(),
            config.maps_subscription_key.clone(),
        ));
        Self {
            config,
            planner,
            maps,
        }
    }
}

/// Props carry services by `Rc`; identity is pointer identity.
#[derive(Clone)]
pub struct SharedServices(pub Rc<Services>);

impl SharedServices {
    #[must_use]
    pub fn new(services: Services) -> Self {
        Self(Rc::new(services))
    }
}

impl std::ops::Deref for SharedServices {
    type Target = Services;

    fn deref(&self) -> &Services {
        &self.0
    }
}

impl PartialEq for SharedServices {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn services_compare_by_identity() {
        let a = SharedServices::new(Services::from_config(ClientConfig::default()));
        let b = SharedServices::new(Services::from_config(ClientConfig::default()));
        assert!(a == a.clone());
        assert!(a != b);
        assert_eq!(a.planner.base_url(), "http://localhost:8000/api");
    }
}
