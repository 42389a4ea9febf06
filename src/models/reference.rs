// Reference data (lookup lists fetched from the data service)

use serde::{Deserialize, Serialize};

use super::form::ReferenceList;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(default)]
    pub sites: Vec<String>,
    #[serde(default)]
    pub equipments: Vec<String>,
}

impl ReferenceData {
    pub fn list(&self, which: ReferenceList) -> &[String] {
        match which {
            ReferenceList::Sites => &self.sites,
            ReferenceList::Equipments => &self.equipments,
        }
    }

    /// Entries of `which` that start with `prefix` (case-insensitive), in source order.
    pub fn suggestions<'a>(
        &'a self,
        which: ReferenceList,
        prefix: &str,
        limit: usize,
    ) -> Vec<&'a str> {
        let needle = prefix.trim().to_lowercase();
        self.list(which)
            .iter()
            .filter(|item| item.to_lowercase().starts_with(&needle))
            .map(String::as_str)
            .take(limit)
            .collect()
    }
}
