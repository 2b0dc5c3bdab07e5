use serde::{Deserialize, Serialize};

use super::model::{Geography, SalesTable};

const INDIAN_REGIONS: [&str; 5] = ["North", "South", "East", "West", "Central"];

const INDIAN_STATES: [&str; 30] = [
    "Andhra Pradesh",
    "Arunachal Pradesh",
    "Assam",
    "Bihar",
    "Chhattisgarh",
    "Goa",
    "Gujarat",
    "Haryana",
    "Himachal Pradesh",
    "Jharkhand",
    "Karnataka",
    "Kerala",
    "Madhya Pradesh",
    "Maharashtra",
    "Manipur",
    "Meghalaya",
    "Mizoram",
    "Nagaland",
    "Odisha",
    "Punjab",
    "Rajasthan",
    "Sikkim",
    "Tamil Nadu",
    "Telangana",
    "Tripura",
    "Uttar Pradesh",
    "Uttarakhand",
    "West Bengal",
    "Delhi",
    "Jammu and Kashmir",
];

const INDIAN_CITIES: [&str; 21] = [
    "Mumbai",
    "Delhi",
    "Bangalore",
    "Hyderabad",
    "Ahmedabad",
    "Chennai",
    "Kolkata",
    "Pune",
    "Jaipur",
    "Lucknow",
    "Surat",
    "Kanpur",
    "Nagpur",
    "Visakhapatnam",
    "Patna",
    "Bhopal",
    "Indore",
    "Vadodara",
    "Coimbatore",
    "Madurai",
    "Thane",
];

/// Where the multi-select option lists come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionCatalog {
    /// Distinct values found in the loaded table.
    #[default]
    Dataset,
    /// Fixed list of Indian regions, states and cities.
    India,
}

/// Values offered by the region / state / city multi-selects.
///
/// Options are presentation only: selecting a value absent from the data is
/// allowed and simply filters everything out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub states: Vec<String>,
    pub cities: Vec<String>,
}

impl FilterOptions {
    pub fn from_catalog(catalog: OptionCatalog, table: &SalesTable) -> Self {
        match catalog {
            OptionCatalog::Dataset => Self::from_table(table),
            OptionCatalog::India => Self::india(),
        }
    }

    /// Sorted distinct values of each geography column.
    pub fn from_table(table: &SalesTable) -> Self {
        let values = |geo: Geography| -> Vec<String> {
            table
                .unique_values
                .get(&geo)
                .map(|set| set.iter().cloned().collect())
                .unwrap_or_default()
        };
        Self {
            regions: values(Geography::Region),
            states: values(Geography::State),
            cities: values(Geography::City),
        }
    }

    pub fn india() -> Self {
        let owned = |list: &[&str]| -> Vec<String> { list.iter().map(|s| s.to_string()).collect() };
        Self {
            regions: owned(&INDIAN_REGIONS[..]),
            states: owned(&INDIAN_STATES[..]),
            cities: owned(&INDIAN_CITIES[..]),
        }
    }

    pub fn values(&self, geo: Geography) -> &[String] {
        match geo {
            Geography::Region => &self.regions,
            Geography::State => &self.states,
            Geography::City => &self.cities,
        }
    }
}
