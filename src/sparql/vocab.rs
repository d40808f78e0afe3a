//! IRIs used by the ADMS import steps

pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";

// ADMS v1
pub const ADMS_ASSET: &str = "http://www.w3.org/ns/adms#Asset";
pub const ADMS_ASSET_DISTRIBUTION: &str = "http://www.w3.org/ns/adms#AssetDistribution";
pub const ADMS_ASSET_REPOSITORY: &str = "http://www.w3.org/ns/adms#AssetRepository";
pub const ADMS_INCLUDED_ASSET: &str = "http://www.w3.org/ns/adms#includedAsset";

// DCAT / ADMS v2
pub const DCAT_CATALOG: &str = "http://www.w3.org/ns/dcat#Catalog";
pub const DCAT_DATASET: &str = "http://www.w3.org/ns/dcat#Dataset";
pub const DCAT_DISTRIBUTION: &str = "http://www.w3.org/ns/dcat#Distribution";
pub const DCAT_ACCESS_URL: &str = "http://www.w3.org/ns/dcat#accessURL";
pub const DCAT_CONTACT_POINT: &str = "http://www.w3.org/ns/dcat#contactPoint";
pub const DCAT_CONTACT_POINT_HTTPS: &str = "https://www.w3.org/ns/dcat#contactPoint";

// Dublin Core
pub const DCT_TITLE: &str = "http://purl.org/dc/terms/title";
pub const DCT_DESCRIPTION: &str = "http://purl.org/dc/terms/description";
pub const DCT_HAS_PART: &str = "http://purl.org/dc/terms/hasPart";
pub const DCT_LICENSE_DOCUMENT: &str = "http://purl.org/dc/terms/LicenseDocument";

// FOAF
pub const FOAF_AGENT: &str = "http://xmlns.com/foaf/0.1/Agent";
pub const FOAF_AGENT_TERM: &str = "http://xmlns.com/foaf/spec/#term_Agent";
pub const FOAF_IMAGE: &str = "http://xmlns.com/foaf/0.1/Image";
pub const FOAF_IMAGE_TERM: &str = "http://xmlns.com/foaf/0.1/#term_Image";
pub const FOAF_NAME: &str = "http://xmlns.com/foaf/0.1/name";

// vCard
pub const VCARD_KIND: &str = "http://www.w3.org/2006/vcard/ns#Kind";
