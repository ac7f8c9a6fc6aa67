use std::collections::HashMap;

use lazy_static::lazy_static;

use crate::core::error::ConfigurationError;
use crate::placement::auction::AuctionPlacement;
use crate::placement::cloud_only::CloudOnlyPlacement;
use crate::placement::edge_first::{EdgeFirstPlacement, EdgeFirstV2Placement};
use crate::placement::edge_ward::EdgeWardPlacement;
use crate::placement::furthest::FurthestPlacement;
use crate::placement::interface::PlacementStrategy;

type PlacementConstructor = fn() -> Box<dyn PlacementStrategy>;

fn auction() -> Box<dyn PlacementStrategy> {
    Box::new(AuctionPlacement {})
}

fn edge_ward() -> Box<dyn PlacementStrategy> {
    Box::new(EdgeWardPlacement {})
}

fn edge_first() -> Box<dyn PlacementStrategy> {
    Box::new(EdgeFirstPlacement {})
}

fn edge_first_v2() -> Box<dyn PlacementStrategy> {
    Box::new(EdgeFirstV2Placement {})
}

fn furthest() -> Box<dyn PlacementStrategy> {
    Box::new(FurthestPlacement {})
}

fn cloud_only() -> Box<dyn PlacementStrategy> {
    Box::new(CloudOnlyPlacement {})
}

lazy_static! {
    pub static ref PLACEMENT_REGISTRY: HashMap<&'static str, PlacementConstructor> = {
        HashMap::from([
            ("auction", auction as PlacementConstructor),
            ("edge_ward", edge_ward as PlacementConstructor),
            ("edge_first", edge_first as PlacementConstructor),
            ("edge_first_v2", edge_first_v2 as PlacementConstructor),
            ("furthest", furthest as PlacementConstructor),
            ("cloud_only", cloud_only as PlacementConstructor),
        ])
    };
}

pub fn resolve_placement_strategy(
    name: &str,
) -> Result<Box<dyn PlacementStrategy>, ConfigurationError> {
    PLACEMENT_REGISTRY
        .get(name)
        .map(|constructor| constructor())
        .ok_or_else(|| ConfigurationError::UnknownPlacementStrategy(name.to_string()))
}
