//! Registry of connected joysticks and their last reported axis directions

use crate::controller::event_collector::StickDevice;
use crate::controller::filter::{filter_stick_axis, AxisSignal};
use crate::mapping::input::AxisDirection;
use tracing::{debug, info, warn};

/// Axis indices at or above this are ignored
pub const MAX_STICK_AXES: u32 = 64;

/// Tracking state for one connected joystick
#[derive(Clone, Debug)]
pub struct StickRecord {
    handle: u32,
    name: String,
    last_direction: Vec<AxisDirection>,
}

impl StickRecord {
    pub fn new(device: StickDevice) -> Self {
        Self {
            handle: device.handle,
            name: device.name,
            last_direction: vec![AxisDirection::Neutral; device.axis_count],
        }
    }

    pub fn handle(&self) -> u32 {
        self.handle
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn axis_count(&self) -> usize {
        self.last_direction.len()
    }

    /// Last direction reported for `axis`, Neutral if never seen
    pub fn last_direction(&self, axis: u32) -> AxisDirection {
        self.last_direction
            .get(axis as usize)
            .copied()
            .unwrap_or_default()
    }

    /// Axes currently reported as pressed, with their direction
    pub fn held_axes(&self) -> impl Iterator<Item = (u32, AxisDirection)> + '_ {
        (0u32..)
            .zip(self.last_direction.iter().copied())
            .filter(|(_, direction)| *direction != AxisDirection::Neutral)
    }

    /// Runs an axis sample through the deadzone filter, updating the record.
    ///
    /// Axes past the enumerated count are added on first use, up to
    /// [`MAX_STICK_AXES`].
    pub fn filter_axis(&mut self, axis: u32, value: i32, deadzone: i32) -> Vec<AxisSignal> {
        if axis >= MAX_STICK_AXES {
            warn!("Stick {} reported axis {}, ignored", self.handle, axis);
            return Vec::new();
        }
        let index = axis as usize;
        if index >= self.last_direction.len() {
            debug!(
                "Stick {} reported axis {} beyond its {} enumerated axes",
                self.handle,
                axis,
                self.last_direction.len()
            );
            self.last_direction.resize(index + 1, AxisDirection::Neutral);
        }
        filter_stick_axis(&mut self.last_direction[index], value, deadzone)
    }
}

#[derive(Clone, Debug, Default)]
pub struct StickRegistry {
    records: Vec<StickRecord>,
}

impl StickRegistry {
    pub fn from_devices(devices: Vec<StickDevice>) -> Self {
        let mut registry = Self::default();
        for device in devices {
            registry.attach(device);
        }
        registry
    }

    /// Adds a stick. A record with the same handle is replaced and returned.
    pub fn attach(&mut self, device: StickDevice) -> Option<StickRecord> {
        info!(
            "Stick {} attached: {} ({} axes)",
            device.handle, device.name, device.axis_count
        );
        let record = StickRecord::new(device);
        match self.records.iter_mut().find(|r| r.handle == record.handle) {
            Some(existing) => Some(std::mem::replace(existing, record)),
            None => {
                self.records.push(record);
                None
            }
        }
    }

    pub fn detach(&mut self, handle: u32) -> Option<StickRecord> {
        let index = self.records.iter().position(|r| r.handle == handle)?;
        let record = self.records.remove(index);
        info!("Stick {} detached: {}", handle, record.name);
        Some(record)
    }

    pub fn get(&self, handle: u32) -> Option<&StickRecord> {
        self.records.iter().find(|record| record.handle == handle)
    }

    pub fn get_mut(&mut self, handle: u32) -> Option<&mut StickRecord> {
        self.records.iter_mut().find(|record| record.handle == handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StickRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::filter::DEADZONE_JOYSTICK;

    fn device(handle: u32, axis_count: usize) -> StickDevice {
        StickDevice {
            handle,
            name: format!("pad {}", handle),
            axis_count,
        }
    }

    #[test]
    fn empty_enumeration_gives_empty_registry() {
        let registry = StickRegistry::from_devices(Vec::new());
        assert!(registry.is_empty());
    }

    #[test]
    fn records_start_neutral() {
        let registry = StickRegistry::from_devices(vec![device(0, 4), device(1, 2)]);
        assert_eq!(registry.len(), 2);
        let record = registry.get(1).unwrap();
        assert_eq!(record.axis_count(), 2);
        assert_eq!(record.last_direction(0), AxisDirection::Neutral);
        assert_eq!(record.last_direction(7), AxisDirection::Neutral);
    }

    #[test]
    fn filter_axis_tracks_direction_per_axis() {
        let mut registry = StickRegistry::from_devices(vec![device(5, 2)]);
        let record = registry.get_mut(5).unwrap();

        record.filter_axis(0, -4000, DEADZONE_JOYSTICK);
        record.filter_axis(1, 4000, DEADZONE_JOYSTICK);
        assert_eq!(record.last_direction(0), AxisDirection::Negative);
        assert_eq!(record.last_direction(1), AxisDirection::Positive);

        let released = record.filter_axis(0, 0, DEADZONE_JOYSTICK);
        assert_eq!(released, vec![AxisSignal::release(AxisDirection::Negative)]);
        assert_eq!(record.last_direction(1), AxisDirection::Positive);
    }

    #[test]
    fn unknown_axis_grows_record() {
        let mut record = StickRecord::new(device(0, 1));
        let signals = record.filter_axis(3, 5000, DEADZONE_JOYSTICK);
        assert_eq!(signals.len(), 1);
        assert_eq!(record.axis_count(), 4);
        assert_eq!(record.last_direction(3), AxisDirection::Positive);
    }

    #[test]
    fn axes_past_the_limit_are_ignored() {
        let mut record = StickRecord::new(device(0, 2));
        let signals = record.filter_axis(u32::MAX, 30000, DEADZONE_JOYSTICK);
        assert!(signals.is_empty());
        assert_eq!(record.axis_count(), 2);

        let signals = record.filter_axis(MAX_STICK_AXES - 1, 30000, DEADZONE_JOYSTICK);
        assert_eq!(signals.len(), 1);
        assert_eq!(record.axis_count(), MAX_STICK_AXES as usize);
    }

    #[test]
    fn attach_replaces_and_detach_removes() {
        let mut registry = StickRegistry::from_devices(vec![device(2, 2)]);
        registry
            .get_mut(2)
            .unwrap()
            .filter_axis(0, 9000, DEADZONE_JOYSTICK);

        let replaced = registry.attach(device(2, 6)).unwrap();
        assert_eq!(
            replaced.held_axes().collect::<Vec<_>>(),
            vec![(0, AxisDirection::Positive)]
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(2).unwrap().axis_count(), 6);
        assert_eq!(
            registry.get(2).unwrap().last_direction(0),
            AxisDirection::Neutral
        );

        let removed = registry.detach(2).unwrap();
        assert_eq!(removed.held_axes().count(), 0);
        assert!(registry.detach(2).is_none());
        assert!(registry.get(2).is_none());
    }
}
