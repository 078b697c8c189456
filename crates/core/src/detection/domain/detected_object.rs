use crate::shared::bounding_box::BoundingBox;

/// One located occurrence of a detected object.
#[derive(Clone, Debug, PartialEq)]
pub struct ObjectInstance {
    pub bounding_box: BoundingBox,
    pub confidence: f32,
}

/// A labelled object with its overall confidence (0-100) and located instances.
///
/// Labels without a location (e.g. "Outdoors") carry no instances.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedObject {
    pub name: String,
    pub confidence: f32,
    pub instances: Vec<ObjectInstance>,
}

impl DetectedObject {
    /// Instances that should be drawn: both the object and the instance must
    /// strictly exceed `threshold`.
    pub fn drawable_instances(&self, threshold: f32) -> impl Iterator<Item = &ObjectInstance> {
        let object_passes = self.confidence > threshold;
        self.instances
            .iter()
            .filter(move |i| object_passes && i.confidence > threshold)
    }
}

/// Result of the object-detection step.
///
/// `degraded` is set when the provider failed and `objects` is empty as a
/// fallback rather than because nothing was in view.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectDetections {
    pub objects: Vec<DetectedObject>,
    pub degraded: bool,
}

impl ObjectDetections {
    pub fn found(objects: Vec<DetectedObject>) -> Self {
        Self {
            objects,
            degraded: false,
        }
    }

    pub fn degraded() -> Self {
        Self {
            objects: Vec::new(),
            degraded: true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects.iter().map(|o| o.name.as_str())
    }
}
