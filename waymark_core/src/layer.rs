// Copyright 2026 the Waymark Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Feature layers: ownership of features and the per-frame update loop.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, HashMap};

use kurbo::{Point, Vec2};

use crate::feature::{Feature, FeatureId, LineFeature, PointFeature, PolygonFeature};
use crate::projection::Projection;
use crate::scene::{NodeId, Scene};
use crate::trace::{
    FeatureUpdateEvent, FrameBeginEvent, FrameSummary, FrameSummaryBuilder, Tracer, halo_events,
};

/// Inputs that invalidate every feature when they change between frames.
#[derive(Clone, Copy, Debug, PartialEq)]
struct FrameParams {
    zoom: f64,
    scale: f64,
    translate: Vec2,
    wireframe: bool,
}

/// A named group of features drawn into one z-sorted layer container.
#[derive(Debug)]
pub struct FeatureLayer {
    name: String,
    container: NodeId,
    features: BTreeMap<FeatureId, Feature>,
    by_container: HashMap<NodeId, FeatureId>,
    last_frame: Option<FrameParams>,
    frame_index: u64,
}

impl FeatureLayer {
    /// Creates the layer and its container in `scene`.
    ///
    /// # Panics
    ///
    /// Panics if the scene already has a layer with this name.
    pub fn new(scene: &mut Scene, name: &str) -> Self {
        let container = scene.add_layer(name);
        Self {
            name: name.to_owned(),
            container,
            features: BTreeMap::new(),
            by_container: HashMap::new(),
            last_frame: None,
            frame_index: 0,
        }
    }

    /// Returns the layer name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the layer container node.
    #[must_use]
    pub fn container(&self) -> NodeId {
        self.container
    }

    /// Adds a point feature.
    ///
    /// # Panics
    ///
    /// Panics if a feature with this id already exists in the layer.
    pub fn add_point(&mut self, scene: &mut Scene, id: impl Into<FeatureId>) -> &mut PointFeature {
        let Feature::Point(point) =
            self.insert(scene, id.into(), |scene, layer, id| Feature::Point(PointFeature::new(scene, layer, id)))
        else {
            unreachable!("inserted a point");
        };
        point
    }

    /// Adds a line feature.
    ///
    /// # Panics
    ///
    /// Panics if a feature with this id already exists in the layer.
    pub fn add_line(&mut self, scene: &mut Scene, id: impl Into<FeatureId>) -> &mut LineFeature {
        let Feature::Line(line) =
            self.insert(scene, id.into(), |scene, layer, id| Feature::Line(LineFeature::new(scene, layer, id)))
        else {
            unreachable!("inserted a line");
        };
        line
    }

    /// Adds a polygon feature.
    ///
    /// # Panics
    ///
    /// Panics if a feature with this id already exists in the layer.
    pub fn add_polygon(&mut self, scene: &mut Scene, id: impl Into<FeatureId>) -> &mut PolygonFeature {
        let Feature::Polygon(polygon) = self.insert(scene, id.into(), |scene, layer, id| {
            Feature::Polygon(PolygonFeature::new(scene, layer, id))
        }) else {
            unreachable!("inserted a polygon");
        };
        polygon
    }

    fn insert(
        &mut self,
        scene: &mut Scene,
        id: FeatureId,
        create: impl FnOnce(&mut Scene, NodeId, FeatureId) -> Feature,
    ) -> &mut Feature {
        let Entry::Vacant(slot) = self.features.entry(id.clone()) else {
            panic!("duplicate feature id {id}");
        };
        let feature = create(scene, self.container, id.clone());
        self.by_container.insert(feature.core().container(), id);
        slot.insert(feature)
    }

    /// Returns the feature with the given id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Feature> {
        self.features.get(id)
    }

    /// Returns the feature with the given id for mutation.
    pub fn get_mut(&mut self, id: &str) -> Option<&mut Feature> {
        self.features.get_mut(id)
    }

    /// Destroys and removes a feature. Returns whether it existed.
    pub fn remove(&mut self, scene: &mut Scene, id: &str) -> bool {
        let Some(mut feature) = self.features.remove(id) else {
            return false;
        };
        self.by_container.remove(&feature.core().container());
        feature.destroy(scene);
        true
    }

    /// Destroys every feature.
    pub fn clear(&mut self, scene: &mut Scene) {
        for (_, mut feature) in core::mem::take(&mut self.features) {
            feature.destroy(scene);
        }
        self.by_container.clear();
    }

    /// Returns the number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Returns `true` if the layer has no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Iterates over the features in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Feature> + '_ {
        self.features.values()
    }

    /// Updates every feature for one frame.
    ///
    /// When the zoom, the projection's scale or translation, or the scene's
    /// wireframe flag differ from the previous frame, every feature is
    /// marked dirty first. Features are visited in id order; clean ones cost
    /// one flag check.
    pub fn render(
        &mut self,
        scene: &mut Scene,
        projection: &dyn Projection,
        zoom: f64,
        tracer: &mut Tracer<'_>,
    ) -> FrameSummary {
        let params = FrameParams {
            zoom,
            scale: projection.scale(),
            translate: projection.translate(),
            wireframe: scene.options.wireframe,
        };
        let invalidated = self.last_frame != Some(params);
        self.last_frame = Some(params);

        let frame_index = self.frame_index;
        self.frame_index += 1;

        tracer.frame_begin(&FrameBeginEvent {
            frame_index,
            zoom,
            feature_count: u32::try_from(self.features.len()).unwrap_or(u32::MAX),
            invalidated,
        });

        let mut summary = FrameSummaryBuilder::new(frame_index);
        for feature in self.features.values_mut() {
            if invalidated {
                feature.core_mut().mark_dirty();
            }
            let report = feature.update(scene, projection, zoom);
            summary.record(&report);
            if !report.updated {
                continue;
            }
            let node = feature.core().container().index();
            tracer.feature_update(&FeatureUpdateEvent {
                frame_index,
                node,
                kind: feature.kind(),
                lod: report.lod,
                geometry: report.geometry,
                style: report.style,
                visible: report.visible,
            });
            for event in halo_events(frame_index, node, &report) {
                tracer.halo(&event);
            }
        }

        let summary = summary.finish(scene.overlay.len());
        tracer.frame_summary(&summary);
        summary
    }

    /// Returns the topmost feature of this layer whose hit area contains the
    /// scene point `p`. Requires a prior [`Scene::evaluate`].
    #[must_use]
    pub fn hit_test(&self, scene: &Scene, p: Point) -> Option<&FeatureId> {
        scene
            .nodes
            .hits(p)
            .find_map(|node| self.by_container.get(&node))
    }
}
