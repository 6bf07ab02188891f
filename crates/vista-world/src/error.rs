#[derive(Debug, Clone, PartialEq)]
pub enum RegionRecordError {
    EmptyBounds { region: String },
    SingularTransform { region: String },
    DegenerateBoundary { region: String, index: usize },
    UnknownAsset { region: String, item: String, asset: String },
    BadAsset { asset: String },
    BadTerrain { region: String },
    DuplicateRegion(String),
}

impl std::fmt::Display for RegionRecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegionRecordError::EmptyBounds { region } => {
                write!(f, "region {}: bounding box is empty", region)
            }
            RegionRecordError::SingularTransform { region } => {
                write!(f, "region {}: transform is not invertible", region)
            }
            RegionRecordError::DegenerateBoundary { region, index } => write!(
                f,
                "region {}: boundary {} is not a planar polygon of at least three points",
                region, index
            ),
            RegionRecordError::UnknownAsset { region, item, asset } => write!(
                f,
                "region {}: item {} references unknown collision asset {}",
                region, item, asset
            ),
            RegionRecordError::BadAsset { asset } => {
                write!(f, "collision asset {} needs exactly one of half_extents or triangles", asset)
            }
            RegionRecordError::BadTerrain { region } => {
                write!(f, "region {}: terrain samples do not match its dimensions", region)
            }
            RegionRecordError::DuplicateRegion(name) => write!(f, "region {} is already loaded", name),
        }
    }
}

impl std::error::Error for RegionRecordError {}
