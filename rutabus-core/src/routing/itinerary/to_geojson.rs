use geo::Point;
use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde_json::json;

use super::{JourneyPlan, Step, StepKind};
use crate::{Error, NodeId};

impl JourneyPlan {
    /// Converts the journey to a `GeoJSON` `FeatureCollection`, one feature
    /// per step. A journey that does not move becomes a single point.
    pub fn to_geojson(&self) -> Result<FeatureCollection, Error> {
        let mut features = Vec::with_capacity(self.steps.len().max(1));

        if self.steps.is_empty() {
            if let Some(at) = self.polyline.first() {
                features.push(create_stationary_feature(self.start_node, at.to_point())?);
            }
        } else {
            for (idx, step) in self.steps.iter().enumerate() {
                features.push(create_step_feature(idx, step)?);
            }
        }

        Ok(FeatureCollection {
            features,
            bbox: None,
            foreign_members: None,
        })
    }

    pub fn to_geojson_string(&self) -> Result<String, Error> {
        serde_json::to_string(&self.to_geojson()?).map_err(|e| Error::GeoJsonError(e.to_string()))
    }
}

fn create_step_feature(step_idx: usize, step: &Step) -> Result<Feature, Error> {
    let geometry = Geometry::new(GeoJsonValue::from(&step.geometry));

    let value = match step.kind {
        StepKind::Walk => json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "leg_type": "walk",
                "leg_index": step_idx,
                "from_node": step.from,
                "to_node": step.to,
                "distance": step.distance,
                "instructions": step.instructions,
            }
        }),
        StepKind::Bus => json!({
            "type": "Feature",
            "geometry": geometry,
            "properties": {
                "leg_type": "bus",
                "leg_index": step_idx,
                "route_id": step.route_id,
                "route_name": step.route_name,
                "direction": step.direction,
                "description": step.description,
                "from_node": step.from,
                "to_node": step.to,
                "distance": step.distance,
                "instructions": step.instructions,
            }
        }),
    };

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}

fn create_stationary_feature(node: NodeId, at: Point<f64>) -> Result<Feature, Error> {
    let value = json!({
        "type": "Feature",
        "geometry": Geometry::new(GeoJsonValue::from(&at)),
        "properties": {
            "leg_type": "stationary",
            "node": node,
        }
    });

    serde_json::from_value::<Feature>(value).map_err(|e| Error::GeoJsonError(e.to_string()))
}
