//! DuckDuckGo region codes and the `duckduckgo://regions` resource.

use serde::{Deserialize, Serialize};

/// URI of the regions resource
pub const REGIONS_URI: &str = "duckduckgo://regions";

/// Known DuckDuckGo region codes with human-readable names
pub const REGION_CODES: &[(&str, &str)] = &[
    ("xa-ar", "Arabia"),
    ("xa-en", "Arabia (en)"),
    ("ar-es", "Argentina"),
    ("au-en", "Australia"),
    ("at-de", "Austria"),
    ("be-fr", "Belgium (fr)"),
    ("be-nl", "Belgium (nl)"),
    ("br-pt", "Brazil"),
    ("bg-bg", "Bulgaria"),
    ("ca-en", "Canada"),
    ("ca-fr", "Canada (fr)"),
    ("ct-ca", "Catalan"),
    ("cl-es", "Chile"),
    ("cn-zh", "China"),
    ("co-es", "Colombia"),
    ("hr-hr", "Croatia"),
    ("cz-cs", "Czech Republic"),
    ("dk-da", "Denmark"),
    ("ee-et", "Estonia"),
    ("fi-fi", "Finland"),
    ("fr-fr", "France"),
    ("de-de", "Germany"),
    ("gr-el", "Greece"),
    ("hk-tzh", "Hong Kong"),
    ("hu-hu", "Hungary"),
    ("in-en", "India"),
    ("id-id", "Indonesia"),
    ("id-en", "Indonesia (en)"),
    ("ie-en", "Ireland"),
    ("il-he", "Israel"),
    ("it-it", "Italy"),
    ("jp-jp", "Japan"),
    ("kr-kr", "Korea"),
    ("lv-lv", "Latvia"),
    ("lt-lt", "Lithuania"),
    ("xl-es", "Latin America"),
    ("my-ms", "Malaysia"),
    ("my-en", "Malaysia (en)"),
    ("mx-es", "Mexico"),
    ("nl-nl", "Netherlands"),
    ("nz-en", "New Zealand"),
    ("no-no", "Norway"),
    ("pe-es", "Peru"),
    ("ph-en", "Philippines"),
    ("ph-tl", "Philippines (tl)"),
    ("pl-pl", "Poland"),
    ("pt-pt", "Portugal"),
    ("ro-ro", "Romania"),
    ("ru-ru", "Russia"),
    ("sg-en", "Singapore"),
    ("sk-sk", "Slovak Republic"),
    ("sl-sl", "Slovenia"),
    ("za-en", "South Africa"),
    ("es-es", "Spain"),
    ("se-sv", "Sweden"),
    ("ch-de", "Switzerland (de)"),
    ("ch-fr", "Switzerland (fr)"),
    ("ch-it", "Switzerland (it)"),
    ("tw-tzh", "Taiwan"),
    ("th-th", "Thailand"),
    ("tr-tr", "Turkey"),
    ("ua-uk", "Ukraine"),
    ("uk-en", "United Kingdom"),
    ("us-en", "United States"),
    ("ue-es", "United States (es)"),
    ("ve-es", "Venezuela"),
    ("vn-vi", "Vietnam"),
    ("wt-wt", "No region"),
];

/// A single region entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    /// Region code passed to the provider
    pub code: String,

    /// Human-readable name
    pub name: String,
}

/// Payload of the regions resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionsResource {
    /// Usage hint for clients
    pub note: String,

    /// Number of regions listed
    pub count: usize,

    /// The regions, in table order
    pub regions: Vec<Region>,
}

/// Build the regions resource payload
pub fn regions_resource() -> RegionsResource {
    let regions: Vec<Region> = REGION_CODES
        .iter()
        .map(|(code, name)| Region {
            code: code.to_string(),
            name: name.to_string(),
        })
        .collect();

    RegionsResource {
        note: format!(
            "Pass one of these codes as the 'region' parameter. Omit it to use the default ({}).",
            crate::types::DEFAULT_REGION
        ),
        count: regions.len(),
        regions,
    }
}

/// Whether `code` is one of the listed region codes
pub fn is_known_region(code: &str) -> bool {
    REGION_CODES.iter().any(|(c, _)| c.eq_ignore_ascii_case(code))
}
