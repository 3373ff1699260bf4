/// Scene manifest, relative to the asset root.
pub const RELATIVE_MANIFEST_PATH: &str = "nexus/dhaka.manifest.json";

/// Extension claimed by the manifest JSON loader.
pub const MANIFEST_EXTENSION: &str = "manifest.json";

/// Extension claimed by the dataset snapshot JSON loader.
pub const DATASETS_EXTENSION: &str = "datasets.json";
